//! Decides whether a service line item belongs on an invoice.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::{BilledType, ServiceLineItem};

/// Why a service line item was left off an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// Usage items are billed by the metering subsystem.
    UsageBilled,
    NotBilled,
    EndedBeforeReferenceTime,
    NotActiveAtReferenceTime,
    /// One-time charge that starts after the period ends.
    StartsAfterPeriod,
    Canceled,
    NegativeQuantity,
    NegativePrice,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UsageBilled => "billed type is usage",
            Self::NotBilled => "billed type is none",
            Self::EndedBeforeReferenceTime => "ended before reference time",
            Self::NotActiveAtReferenceTime => "not active at reference time",
            Self::StartsAfterPeriod => "one-time charge starts after period end",
            Self::Canceled => "one-time charge is canceled",
            Self::NegativeQuantity => "quantity is negative",
            Self::NegativePrice => "price is negative",
        };
        f.write_str(text)
    }
}

/// Evaluate the eligibility rules in order; the first matching rule
/// excludes the item.
///
/// `reference_time` is the instant recurrent items must be active at;
/// `period_end` is the end-of-day instant of the invoice period.
pub fn check_eligibility(
    sli: &ServiceLineItem,
    reference_time: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Result<(), ExclusionReason> {
    match sli.billed_type {
        BilledType::Usage => return Err(ExclusionReason::UsageBilled),
        BilledType::None => return Err(ExclusionReason::NotBilled),
        BilledType::Once | BilledType::Monthly | BilledType::Quarterly | BilledType::Annually => {}
    }
    if sli.ended_at.is_some_and(|ended| ended < reference_time) {
        return Err(ExclusionReason::EndedBeforeReferenceTime);
    }
    if sli.billed_type.is_recurrent() && !sli.is_active_at(reference_time) {
        return Err(ExclusionReason::NotActiveAtReferenceTime);
    }
    if sli.billed_type.is_one_time() {
        if sli.started_at > period_end {
            return Err(ExclusionReason::StartsAfterPeriod);
        }
        if sli.canceled {
            return Err(ExclusionReason::Canceled);
        }
    }
    if sli.quantity < 0 {
        return Err(ExclusionReason::NegativeQuantity);
    }
    if sli.price < Decimal::ZERO {
        return Err(ExclusionReason::NegativePrice);
    }
    Ok(())
}

/// Whether `sli` belongs on the invoice.
pub fn is_eligible(
    sli: &ServiceLineItem,
    reference_time: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> bool {
    check_eligibility(sli, reference_time, period_end).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn t(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn sli(billed_type: BilledType) -> ServiceLineItem {
        ServiceLineItem {
            id: "sli-1".into(),
            parent_id: "sli-1".into(),
            name: "Seat".into(),
            comments: None,
            billed_type,
            price: dec!(10),
            quantity: 1,
            started_at: t(1),
            ended_at: None,
            vat_rate: dec!(0),
            canceled: false,
        }
    }

    fn period_end() -> DateTime<Utc> {
        t(31) + Duration::days(1) - Duration::nanoseconds(1)
    }

    #[test]
    fn usage_and_none_always_excluded() {
        let mut usage = sli(BilledType::Usage);
        usage.quantity = 1000;
        assert_eq!(
            check_eligibility(&usage, t(1), period_end()),
            Err(ExclusionReason::UsageBilled)
        );
        assert_eq!(
            check_eligibility(&sli(BilledType::None), t(1), period_end()),
            Err(ExclusionReason::NotBilled)
        );
    }

    #[test]
    fn ended_before_reference_excluded() {
        let mut item = sli(BilledType::Once);
        item.ended_at = Some(t(5));
        assert_eq!(
            check_eligibility(&item, t(10), period_end()),
            Err(ExclusionReason::EndedBeforeReferenceTime)
        );
    }

    #[test]
    fn recurrent_must_be_active() {
        let mut item = sli(BilledType::Monthly);
        item.started_at = t(15);
        assert_eq!(
            check_eligibility(&item, t(1), period_end()),
            Err(ExclusionReason::NotActiveAtReferenceTime)
        );
        assert!(is_eligible(&item, period_end(), period_end()));
    }

    #[test]
    fn one_time_in_future_excluded() {
        let mut item = sli(BilledType::Once);
        item.started_at = period_end() + Duration::nanoseconds(1);
        assert_eq!(
            check_eligibility(&item, t(1), period_end()),
            Err(ExclusionReason::StartsAfterPeriod)
        );
    }

    #[test]
    fn one_time_started_mid_period_is_eligible() {
        let mut item = sli(BilledType::Once);
        item.started_at = t(20);
        assert!(is_eligible(&item, t(1), period_end()));
    }

    #[test]
    fn canceled_only_matters_for_one_time() {
        let mut once = sli(BilledType::Once);
        once.canceled = true;
        assert_eq!(
            check_eligibility(&once, t(1), period_end()),
            Err(ExclusionReason::Canceled)
        );
        let mut monthly = sli(BilledType::Monthly);
        monthly.canceled = true;
        assert!(is_eligible(&monthly, t(1), period_end()));
    }

    #[test]
    fn negative_values_excluded() {
        let mut item = sli(BilledType::Monthly);
        item.quantity = -1;
        assert_eq!(
            check_eligibility(&item, t(1), period_end()),
            Err(ExclusionReason::NegativeQuantity)
        );
        item.quantity = 1;
        item.price = dec!(-0.01);
        assert_eq!(
            check_eligibility(&item, t(1), period_end()),
            Err(ExclusionReason::NegativePrice)
        );
    }

    #[test]
    fn rule_order_is_respected() {
        // Usage wins over every later rule
        let mut item = sli(BilledType::Usage);
        item.canceled = true;
        item.quantity = -5;
        item.ended_at = Some(t(1));
        assert_eq!(
            check_eligibility(&item, t(10), period_end()),
            Err(ExclusionReason::UsageBilled)
        );
    }
}
