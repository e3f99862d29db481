use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::core::{BilledType, BillingCycle, BillingError, normalized_unit_price, truncate_2dp, try_cycle_end};

/// Divisor used to spread an annual amount over days.
pub const DAYS_PER_YEAR: i64 = 365;

/// Share of `annual` covering the days from `start` to `end`.
///
/// Returns zero when the span is empty or negative and `None` on
/// overflow. The result is not truncated.
pub fn prorate_annual_amount(start: NaiveDate, end: NaiveDate, annual: Decimal) -> Option<Decimal> {
    let days = (end - start).num_days();
    let prorated = annual
        .checked_mul(Decimal::from(days))?
        .checked_div(Decimal::from(DAYS_PER_YEAR))?;
    Some(prorated.max(Decimal::ZERO))
}

/// Price of `quantity` units for a whole year.
///
/// The yearly unit price is truncated before it is multiplied, like the
/// unit price of a regular cycle line. Non-recurrent items yield zero,
/// an amount beyond the `Decimal` range yields `None`.
pub fn annualized_amount(quantity: i64, price: Decimal, billed_type: BilledType) -> Option<Decimal> {
    if quantity == 0 || price.is_zero() || !billed_type.is_recurrent() {
        return Some(Decimal::ZERO);
    }
    let unit = truncate_2dp(normalized_unit_price(price, billed_type, BillingCycle::Annually)?);
    Decimal::from(quantity).checked_mul(unit)
}

/// Period of an off-cycle invoice.
///
/// The period starts the day after `earliest_started`. Its end is the
/// first cycle end after that start, stepping cycle by cycle from
/// `invoicing_start`.
///
/// # Errors
///
/// Returns [`BillingError::InvalidBillingCycle`] for an unsupported cycle.
pub fn off_cycle_period(
    invoicing_start: NaiveDate,
    earliest_started: NaiveDate,
    cycle: BillingCycle,
) -> Result<(NaiveDate, NaiveDate), BillingError> {
    let start = next_day(earliest_started)?;
    let mut end = try_cycle_end(invoicing_start, cycle)?;
    while end <= start {
        end = try_cycle_end(next_day(end)?, cycle)?;
    }
    Ok((start, end))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, BillingError> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| BillingError::Builder(format!("no day after {date}")))
}
