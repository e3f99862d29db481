//! # zyklus
//!
//! Billing-cycle invoice computation for subscription contracts: turns a
//! contract's service line items into the lines and totals of one
//! billing period's invoice.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are truncated
//! toward zero at 2 decimal places. Never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use rust_decimal_macros::dec;
//! use zyklus::core::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let invoice = InvoiceBuilder::new("INV-001", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .billing_cycle(BillingCycle::Monthly)
//!     .build()
//!     .unwrap();
//!
//! let started = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
//! let slis = vec![
//!     ServiceLineItemBuilder::new("s1", "Platform", BilledType::Annually, 1, dec!(1200), started)
//!         .vat_rate(dec!(19))
//!         .build(),
//! ];
//!
//! let filled = fill_invoice(&NoPriorInvoices, &invoice, &slis).await.unwrap();
//! assert_eq!(filled.amount, dec!(100.00));
//! assert_eq!(filled.vat, dec!(19.00));
//! assert_eq!(filled.total_amount, dec!(119.00));
//! assert!(validate_invoice(&filled).is_empty());
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Data model, cadence conversion, eligibility, invoice fill, validation |
//! | `proration` | Off-cycle prorated prepaid invoices |
//! | `simulation` | Invoice shells, dry-run previews, ad-hoc simulation, preview numbers |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "proration")]
pub mod proration;

#[cfg(feature = "simulation")]
pub mod simulation;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
