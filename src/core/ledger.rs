//! Lookup of previously billed invoice lines, used to bill one-time
//! charges at most once.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::error::{BillingError, LedgerError};
use super::types::{BilledType, Invoice, InvoicedLine};

/// Store of invoice lines already billed for one contract, across every
/// invoice version.
///
/// This is the only I/O the engine performs. Implementations backed by
/// a database should run the lookup and the eventual write of the filled
/// invoice in one transaction, or enforce a unique index on
/// `(contract, service_line_item_parent_id)` for one-time lines.
#[async_trait]
pub trait InvoiceLedger: Send + Sync {
    /// Latest stored line whose `service_line_item_parent_id` equals
    /// `parent_id`, if any.
    async fn latest_invoice_line_by_parent_id(
        &self,
        parent_id: &str,
    ) -> Result<Option<InvoicedLine>, LedgerError>;
}

/// Ledger that has never billed anything. Used for ad-hoc simulations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPriorInvoices;

#[async_trait]
impl InvoiceLedger for NoPriorInvoices {
    async fn latest_invoice_line_by_parent_id(
        &self,
        _parent_id: &str,
    ) -> Result<Option<InvoicedLine>, LedgerError> {
        Ok(None)
    }
}

/// In-memory ledger for a single contract.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    lines: RwLock<HashMap<String, InvoicedLine>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every line of `invoice`, replacing older entries for the
    /// same parent id.
    pub fn record(&self, invoice: &Invoice) {
        let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
        store(&mut lines, invoice);
    }

    /// Record `invoice` unless one of its one-time lines was billed
    /// already. Check and write happen under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::DuplicateOneTimeCharge`] with the parent id
    /// of the first one-time line found in the ledger; nothing is recorded.
    pub fn try_record(&self, invoice: &Invoice) -> Result<(), BillingError> {
        let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(duplicate) = invoice.lines.iter().find(|line| {
            line.billed_type == BilledType::Once
                && lines.contains_key(&line.service_line_item_parent_id)
        }) {
            return Err(BillingError::DuplicateOneTimeCharge(
                duplicate.service_line_item_parent_id.clone(),
            ));
        }
        store(&mut lines, invoice);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lines.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn store(lines: &mut HashMap<String, InvoicedLine>, invoice: &Invoice) {
    for line in &invoice.lines {
        lines.insert(
            line.service_line_item_parent_id.clone(),
            InvoicedLine {
                invoice_number: invoice.number.clone(),
                invoice_period_end: invoice.period_end_date,
                line: line.clone(),
            },
        );
    }
}

#[async_trait]
impl InvoiceLedger for MemoryLedger {
    async fn latest_invoice_line_by_parent_id(
        &self,
        parent_id: &str,
    ) -> Result<Option<InvoicedLine>, LedgerError> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        Ok(lines.get(parent_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(number: &str, billed_type: BilledType, parent_id: &str) -> Invoice {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        Invoice {
            number: number.into(),
            contract_id: "c1".into(),
            currency: "EUR".into(),
            note: None,
            period_start_date: start,
            period_end_date: end,
            issued_date: start,
            due_date: end,
            billing_cycle: BillingCycle::Monthly,
            postpaid: false,
            dry_run: false,
            preview: false,
            off_cycle: false,
            status: InvoiceStatus::Due,
            amount: dec!(10),
            vat: dec!(0),
            total_amount: dec!(10),
            lines: vec![InvoiceLine {
                name: "Setup".into(),
                price: dec!(10),
                quantity: 1,
                amount: dec!(10),
                vat: dec!(0),
                total: dec!(10),
                billed_type,
                service_line_item_id: format!("{parent_id}-v1"),
                service_line_item_parent_id: parent_id.into(),
            }],
        }
    }

    #[tokio::test]
    async fn empty_ledger_reports_nothing() {
        assert!(NoPriorInvoices.latest_invoice_line_by_parent_id("p1").await.unwrap().is_none());
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.latest_invoice_line_by_parent_id("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recorded_lines_are_found_by_parent() {
        let ledger = MemoryLedger::new();
        ledger.record(&invoice("INV-1", BilledType::Once, "p1"));
        let found = ledger.latest_invoice_line_by_parent_id("p1").await.unwrap().unwrap();
        assert_eq!(found.invoice_number, "INV-1");
        assert_eq!(found.line.service_line_item_id, "p1-v1");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn try_record_rejects_second_one_time_charge() {
        let ledger = MemoryLedger::new();
        ledger.try_record(&invoice("INV-1", BilledType::Once, "p1")).unwrap();
        let err = ledger.try_record(&invoice("INV-2", BilledType::Once, "p1")).unwrap_err();
        assert!(matches!(err, BillingError::DuplicateOneTimeCharge(ref p) if p == "p1"));
    }

    #[test]
    fn try_record_allows_recurrent_lines_again() {
        let ledger = MemoryLedger::new();
        ledger.try_record(&invoice("INV-1", BilledType::Monthly, "p1")).unwrap();
        ledger.try_record(&invoice("INV-2", BilledType::Monthly, "p1")).unwrap();
        assert_eq!(ledger.len(), 1);
    }
}
