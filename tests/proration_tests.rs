//! Off-cycle prorated invoices.
//!
//! Run with: `cargo test --features proration --test proration_tests`

#![cfg(feature = "proration")]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use zyklus::core::*;
use zyklus::proration::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn off_cycle_invoice(earliest: NaiveDate) -> Invoice {
    let (start, end) = off_cycle_period(date(2024, 1, 1), earliest, BillingCycle::Monthly).unwrap();
    InvoiceBuilder::new("OC-1", start)
        .period_end(end)
        .billing_cycle(BillingCycle::Monthly)
        .off_cycle(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn new_seat_mid_month() {
    // 12 seats per year at 10/month, added Apr 10; period Apr 11 - Apr 30
    let sli = ServiceLineItemBuilder::new("s1", "Seat", BilledType::Monthly, 1, dec!(10), at(2024, 4, 10))
        .vat_rate(dec!(19))
        .build();
    let invoice = off_cycle_invoice(date(2024, 4, 10));
    assert_eq!(invoice.period_start_date, date(2024, 4, 11));
    assert_eq!(invoice.period_end_date, date(2024, 4, 30));

    let filled = fill_off_cycle_invoice(&NoPriorInvoices, &invoice, &[sli]).await.unwrap();
    // 120 * 20 / 365 = 6.5753.. -> 6.57
    assert_eq!(filled.amount, dec!(6.57));
    assert_eq!(filled.vat, dec!(1.24));
    assert_eq!(filled.total_amount, dec!(7.81));
    assert_eq!(filled.lines[0].price, dec!(10));
    assert!(validate_invoice(&filled).is_empty());
}

#[tokio::test]
async fn previous_cycle_invoice_is_not_deducted() {
    let ledger = MemoryLedger::new();
    let march = InvoiceBuilder::new("INV-03", date(2024, 3, 1)).build().unwrap();
    let v1 = ServiceLineItemBuilder::new("v1", "Seat", BilledType::Monthly, 1, dec!(10), at(2024, 1, 1))
        .ended_at(at(2024, 4, 10))
        .build();
    let billed = fill_invoice(&ledger, &march, std::slice::from_ref(&v1)).await.unwrap();
    ledger.record(&billed);

    let v2 = ServiceLineItemBuilder::new("v2", "Seat", BilledType::Monthly, 2, dec!(10), at(2024, 4, 10))
        .parent_id("v1")
        .build();
    let filled = fill_off_cycle_invoice(&ledger, &off_cycle_invoice(date(2024, 4, 10)), &[v1, v2])
        .await
        .unwrap();
    // March invoice ends before April: the full prorated amount is charged
    // 240 * 20 / 365 = 13.150.. -> 13.15
    assert_eq!(filled.amount, dec!(13.15));
}

#[tokio::test]
async fn fully_covered_change_is_skipped() {
    let ledger = MemoryLedger::new();
    let april = InvoiceBuilder::new("INV-04", date(2024, 4, 1)).build().unwrap();
    let v1 = ServiceLineItemBuilder::new("v1", "Seat", BilledType::Monthly, 2, dec!(10), at(2024, 1, 1))
        .ended_at(at(2024, 4, 10))
        .build();
    let billed = fill_invoice(&ledger, &april, std::slice::from_ref(&v1)).await.unwrap();
    ledger.record(&billed);

    // Quantity reduced: nothing extra to charge
    let v2 = ServiceLineItemBuilder::new("v2", "Seat", BilledType::Monthly, 1, dec!(10), at(2024, 4, 10))
        .parent_id("v1")
        .build();
    let err = fill_off_cycle_invoice(&ledger, &off_cycle_invoice(date(2024, 4, 10)), &[v1, v2])
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::NoInvoiceLines));
}

#[tokio::test]
async fn one_time_items_billed_in_full() {
    let setup = ServiceLineItemBuilder::new("o1", "Onboarding", BilledType::Once, 2, dec!(150.005), at(2024, 4, 2)).build();
    let canceled = ServiceLineItemBuilder::new("o2", "Training", BilledType::Once, 1, dec!(80), at(2024, 4, 2))
        .canceled(true)
        .build();
    let filled = fill_off_cycle_invoice(&NoPriorInvoices, &off_cycle_invoice(date(2024, 4, 10)), &[setup, canceled])
        .await
        .unwrap();
    assert_eq!(filled.lines.len(), 1);
    assert_eq!(filled.amount, dec!(300.01));
}

#[tokio::test]
async fn usage_items_ignored() {
    let usage = ServiceLineItemBuilder::new("u", "API", BilledType::Usage, 100, dec!(1), at(2024, 1, 1)).build();
    let err = fill_off_cycle_invoice(&NoPriorInvoices, &off_cycle_invoice(date(2024, 4, 10)), &[usage])
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::NoInvoiceLines));
}
