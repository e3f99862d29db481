#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use zyklus::core::{BillingCycle, cycle_end, try_cycle_end};

fuzz_target!(|input: (i32, u8)| {
    let (days, cycle) = input;
    let Some(start) = NaiveDate::from_num_days_from_ce_opt(days) else {
        return;
    };
    let cycle = match cycle % 4 {
        0 => BillingCycle::None,
        1 => BillingCycle::Monthly,
        2 => BillingCycle::Quarterly,
        _ => BillingCycle::Annually,
    };
    // Errors are fine near the calendar limits, panics are bugs.
    if let Ok(end) = try_cycle_end(start, cycle) {
        assert!(end >= start);
    }
    let _ = cycle_end(start, cycle);
});
