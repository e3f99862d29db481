//! Cadence price conversion and line amount arithmetic.
//!
//! All arithmetic is checked. Functions return `None` when an
//! intermediate value does not fit in a `Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::BillingError;
use super::types::{BilledType, BillingCycle};

/// Truncate toward zero at 2 decimal places. Never rounds up.
pub fn truncate_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Convert a unit price quoted at `billed_type` cadence into the
/// equivalent unit price at the invoice's `cycle`.
///
/// One-time prices are returned unchanged. Cadences without a length
/// (`Usage`, `None`) and an unconfigured cycle yield zero. The result is
/// not truncated.
pub fn normalized_unit_price(
    price: Decimal,
    billed_type: BilledType,
    cycle: BillingCycle,
) -> Option<Decimal> {
    if billed_type.is_one_time() {
        return Some(price);
    }
    match (billed_type.months(), cycle.months()) {
        (Some(item_months), Some(cycle_months)) if item_months == cycle_months => Some(price),
        (Some(item_months), Some(cycle_months)) if cycle_months > item_months => {
            price.checked_mul(Decimal::from(cycle_months / item_months))
        }
        (Some(item_months), Some(cycle_months)) => {
            price.checked_div(Decimal::from(item_months / cycle_months))
        }
        _ => Some(Decimal::ZERO),
    }
}

/// Amount, VAT and total of one invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// Unit price as it appears on the line.
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub vat: Decimal,
    /// `amount + vat`, exact.
    pub total: Decimal,
}

/// Compute the amounts for `quantity` units at an already normalized
/// `unit_price`.
///
/// `amount = truncate(quantity * unit_price)`,
/// `vat = truncate(amount * vat_rate / 100)`, `total = amount + vat`.
pub fn line_amounts(quantity: i64, unit_price: Decimal, vat_rate: Decimal) -> Option<LineAmounts> {
    let amount = truncate_2dp(Decimal::from(quantity).checked_mul(unit_price)?);
    let vat = vat_for(amount, vat_rate)?;
    Some(LineAmounts {
        unit_price,
        amount,
        vat,
        total: amount.checked_add(vat)?,
    })
}

/// Amounts for a one-time charge: the price is used as quoted.
pub fn one_time_amounts(quantity: i64, price: Decimal, vat_rate: Decimal) -> Option<LineAmounts> {
    line_amounts(quantity, price, vat_rate)
}

/// Amounts for a recurrent item on an invoice of `cycle`.
///
/// The normalized unit price is truncated once before it is multiplied
/// by the quantity.
pub fn recurrent_amounts(
    quantity: i64,
    price: Decimal,
    billed_type: BilledType,
    cycle: BillingCycle,
    vat_rate: Decimal,
) -> Option<LineAmounts> {
    let unit = truncate_2dp(normalized_unit_price(price, billed_type, cycle)?);
    line_amounts(quantity, unit, vat_rate)
}

/// VAT on an already truncated amount.
pub fn vat_for(amount: Decimal, vat_rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(vat_rate)?
        .checked_div(dec!(100))
        .map(truncate_2dp)
}

/// `a + b`, or [`BillingError::Overflow`] naming `what`.
pub(crate) fn checked_sum(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, BillingError> {
    a.checked_add(b)
        .ok_or_else(|| BillingError::Overflow(format!("{what} exceeds the decimal range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_never_rounds_up() {
        assert_eq!(truncate_2dp(dec!(0.339)), dec!(0.33));
        assert_eq!(truncate_2dp(dec!(0.033)), dec!(0.03));
        assert_eq!(truncate_2dp(dec!(-1.999)), dec!(-1.99));
        assert_eq!(truncate_2dp(dec!(5)), dec!(5));
    }

    #[test]
    fn conversion_matrix() {
        use BilledType as B;
        use BillingCycle as C;
        let p = dec!(1200);
        assert_eq!(normalized_unit_price(p, B::Monthly, C::Monthly), Some(dec!(1200)));
        assert_eq!(normalized_unit_price(p, B::Quarterly, C::Monthly), Some(dec!(400)));
        assert_eq!(normalized_unit_price(p, B::Annually, C::Monthly), Some(dec!(100)));
        assert_eq!(normalized_unit_price(p, B::Monthly, C::Quarterly), Some(dec!(3600)));
        assert_eq!(normalized_unit_price(p, B::Quarterly, C::Quarterly), Some(dec!(1200)));
        assert_eq!(normalized_unit_price(p, B::Annually, C::Quarterly), Some(dec!(300)));
        assert_eq!(normalized_unit_price(p, B::Monthly, C::Annually), Some(dec!(14400)));
        assert_eq!(normalized_unit_price(p, B::Quarterly, C::Annually), Some(dec!(4800)));
        assert_eq!(normalized_unit_price(p, B::Annually, C::Annually), Some(dec!(1200)));
    }

    #[test]
    fn one_time_price_is_not_converted() {
        assert_eq!(
            normalized_unit_price(dec!(49.99), BilledType::Once, BillingCycle::Annually),
            Some(dec!(49.99))
        );
    }

    #[test]
    fn uncovered_combinations_are_zero() {
        assert_eq!(
            normalized_unit_price(dec!(10), BilledType::Usage, BillingCycle::Monthly),
            Some(Decimal::ZERO)
        );
        assert_eq!(
            normalized_unit_price(dec!(10), BilledType::None, BillingCycle::Monthly),
            Some(Decimal::ZERO)
        );
        assert_eq!(
            normalized_unit_price(dec!(10), BilledType::Monthly, BillingCycle::None),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn normalizer_does_not_truncate() {
        let unit = normalized_unit_price(dec!(100), BilledType::Quarterly, BillingCycle::Monthly).unwrap();
        assert!(unit > dec!(33.33));
        assert_eq!(truncate_2dp(unit), dec!(33.33));
    }

    #[test]
    fn truncation_order() {
        let amounts = recurrent_amounts(
            1,
            dec!(0.33333),
            BilledType::Monthly,
            BillingCycle::Monthly,
            dec!(10),
        )
        .unwrap();
        assert_eq!(amounts.amount, dec!(0.33));
        assert_eq!(amounts.vat, dec!(0.03));
        assert_eq!(amounts.total, dec!(0.36));
    }

    #[test]
    fn unit_price_truncated_before_quantity() {
        // 100 / 3 = 33.33 per unit, so 3 units are 99.99 and not 100.00
        let amounts = recurrent_amounts(
            3,
            dec!(100),
            BilledType::Quarterly,
            BillingCycle::Monthly,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(amounts.unit_price, dec!(33.33));
        assert_eq!(amounts.amount, dec!(99.99));
    }

    #[test]
    fn one_time_amount_truncates_product() {
        let amounts = one_time_amounts(3, dec!(0.335), dec!(19)).unwrap();
        // 1.005 -> 1.00, VAT 0.19
        assert_eq!(amounts.amount, dec!(1.00));
        assert_eq!(amounts.vat, dec!(0.19));
        assert_eq!(amounts.total, dec!(1.19));
    }

    #[test]
    fn overflowing_products_are_reported() {
        assert_eq!(line_amounts(i64::MAX, dec!(10000000000), Decimal::ZERO), None);
        assert_eq!(
            normalized_unit_price(Decimal::MAX, BilledType::Monthly, BillingCycle::Annually),
            None
        );
        assert_eq!(vat_for(Decimal::MAX, dec!(19)), None);
        assert!(line_amounts(i64::MAX, dec!(1), Decimal::ZERO).is_some());
    }
}
