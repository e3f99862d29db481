//! Period arithmetic for billing cycles.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};

use super::error::BillingError;
use super::types::{BillingCycle, Invoice};

/// Last day of the period that starts on `start`.
///
/// `Monthly` is `start + 1 month - 1 day`, `Quarterly` adds 3 months,
/// `Annually` 1 year. Month arithmetic clamps to the end of the target
/// month, so a period starting on Jan 31 ends on Feb 27 (or 28 in a
/// leap year).
///
/// # Errors
///
/// Returns [`BillingError::InvalidBillingCycle`] for [`BillingCycle::None`]
/// or when the result falls outside the supported calendar.
pub fn try_cycle_end(start: NaiveDate, cycle: BillingCycle) -> Result<NaiveDate, BillingError> {
    let months = cycle
        .months()
        .ok_or_else(|| BillingError::InvalidBillingCycle(cycle.code().to_string()))?;
    start
        .checked_add_months(Months::new(months))
        .and_then(|next_start| next_start.pred_opt())
        .ok_or_else(|| {
            BillingError::InvalidBillingCycle(format!("{} from {start} is out of range", cycle.code()))
        })
}

/// Infallible form of [`try_cycle_end`]: an unsupported cycle returns
/// `start` unchanged and is logged as an anomaly.
pub fn cycle_end(start: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    match try_cycle_end(start, cycle) {
        Ok(end) => end,
        Err(err) => {
            tracing::error!(billing_cycle = cycle.code(), %start, error = %err, "cannot compute cycle end");
            start
        }
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// The last representable instant of `date` in UTC.
pub fn end_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    start_of_day_utc(date) + Duration::days(1) - Duration::nanoseconds(1)
}

/// Instant at which service line items are evaluated for `invoice`:
/// the end of the period for postpaid invoices, its start otherwise.
pub fn reference_time(invoice: &Invoice) -> DateTime<Utc> {
    if invoice.postpaid {
        end_of_day_utc(invoice.period_end_date)
    } else {
        start_of_day_utc(invoice.period_start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_cycle_end() {
        assert_eq!(cycle_end(date(2024, 1, 1), BillingCycle::Monthly), date(2024, 1, 31));
        assert_eq!(cycle_end(date(2024, 1, 15), BillingCycle::Monthly), date(2024, 2, 14));
    }

    #[test]
    fn quarterly_and_annual_cycle_end() {
        assert_eq!(cycle_end(date(2024, 1, 1), BillingCycle::Quarterly), date(2024, 3, 31));
        assert_eq!(cycle_end(date(2024, 1, 1), BillingCycle::Annually), date(2024, 12, 31));
        assert_eq!(cycle_end(date(2024, 3, 1), BillingCycle::Annually), date(2025, 2, 28));
    }

    #[test]
    fn month_end_start_clamps() {
        assert_eq!(cycle_end(date(2024, 1, 31), BillingCycle::Monthly), date(2024, 2, 28));
        assert_eq!(cycle_end(date(2023, 1, 31), BillingCycle::Monthly), date(2023, 2, 27));
    }

    #[test]
    fn unsupported_cycle_is_noop() {
        let start = date(2024, 5, 10);
        assert_eq!(cycle_end(start, BillingCycle::None), start);
        assert!(matches!(
            try_cycle_end(start, BillingCycle::None),
            Err(BillingError::InvalidBillingCycle(_))
        ));
    }

    #[test]
    fn end_of_day_is_last_nanosecond() {
        let eod = end_of_day_utc(date(2024, 1, 31));
        assert_eq!(eod.date_naive(), date(2024, 1, 31));
        assert_eq!(eod.hour(), 23);
        assert_eq!(eod.nanosecond(), 999_999_999);
        assert_eq!(eod + Duration::nanoseconds(1), start_of_day_utc(date(2024, 2, 1)));
    }
}
