//! Off-cycle prorated prepaid invoices.
//!
//! When a service changes mid-cycle, an off-cycle invoice charges the
//! annualized price of each recurrent item for the days between the
//! item's start and the end of the current cycle, minus what the regular
//! cycle invoice already charged for the same span.
//!
//! # Example
//!
//! ```ignore
//! use zyklus::proration::*;
//!
//! let (start, end) = off_cycle_period(invoicing_start, earliest_started, BillingCycle::Monthly)?;
//! let invoice = InvoiceBuilder::new("INV-OC-1", start)
//!     .period_end(end)
//!     .off_cycle(true)
//!     .build()?;
//! let filled = fill_off_cycle_invoice(&ledger, &invoice, &slis).await?;
//! ```

mod fill;
mod period;

pub use fill::fill_off_cycle_invoice;
pub use period::{DAYS_PER_YEAR, annualized_amount, off_cycle_period, prorate_annual_amount};
