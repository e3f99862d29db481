//! Dry-run invoices: previews of the next invoice and ad-hoc simulations.
//!
//! Nothing computed here is persisted. Invoice shells are derived from the
//! contract and tenant settings, filled by [`crate::core::fill_invoice`]
//! and returned with the status a real fill would give them.
//!
//! # Example
//!
//! ```ignore
//! use zyklus::simulation::*;
//!
//! let preview = preview_next_invoice(&ledger, &contract, &settings, prior.as_ref(), &slis).await?;
//! assert_eq!(preview.status, InvoiceStatus::Scheduled);
//! ```

mod numbering;
mod request;
mod shell;
mod simulate;

pub use numbering::{generate_invoice_number, generate_invoice_number_with, is_preview_number};
pub use request::{SimulatedServiceLine, into_service_line_items};
pub use shell::InvoiceShellBuilder;
pub use simulate::{preview_next_invoice, simulate, simulate_with_changes};
