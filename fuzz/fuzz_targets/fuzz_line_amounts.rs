#![no_main]

use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;
use zyklus::core::pricing::{line_amounts, recurrent_amounts};
use zyklus::core::{BilledType, BillingCycle, truncate_2dp};

fuzz_target!(|input: (i64, i64, u8, u16, u8)| {
    let (quantity, mantissa, scale, vat, kind) = input;
    let price = Decimal::new(mantissa, u32::from(scale % 29));
    let vat_rate = Decimal::new(i64::from(vat % 10_000), 2);
    let billed = match kind % 3 {
        0 => BilledType::Monthly,
        1 => BilledType::Quarterly,
        _ => BilledType::Annually,
    };

    // Overflow must surface as None, never as a panic.
    if let Some(amounts) = recurrent_amounts(quantity, price, billed, BillingCycle::Annually, vat_rate) {
        assert_eq!(amounts.total, amounts.amount + amounts.vat);
        assert_eq!(truncate_2dp(amounts.amount), amounts.amount);
    }

    if let Some(once) = line_amounts(quantity, price, vat_rate) {
        assert_eq!(once.total, once.amount + once.vat);
    }
});
