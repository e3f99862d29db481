//! Core billing-cycle types and invoice computation.
//!
//! This module holds the data model, period arithmetic, cadence price
//! conversion, the eligibility filter, the idempotency ledger and the
//! aggregator that fills an invoice from a contract's service line items.

mod builder;
mod calendar;
mod eligibility;
mod error;
mod fill;
mod ledger;
pub mod pricing;
mod types;
mod validation;

pub use builder::*;
pub use calendar::*;
pub use eligibility::*;
pub use error::*;
pub use fill::*;
pub use ledger::*;
pub use pricing::{LineAmounts, normalized_unit_price, truncate_2dp};
pub use types::*;
pub use validation::*;
