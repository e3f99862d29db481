use thiserror::Error;

/// Error returned by an [`InvoiceLedger`](super::InvoiceLedger) lookup.
///
/// Boxed so that storage errors reach the caller unchanged and can be
/// recovered with `downcast_ref`.
pub type LedgerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while computing or simulating an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// Every service line item was excluded or already invoiced.
    /// The invoice stays unfilled and must not be persisted as complete.
    #[error("invoice has no billable lines")]
    NoInvoiceLines,

    /// An unsupported billing cycle reached the calendar.
    #[error("invalid billing cycle: {0}")]
    InvalidBillingCycle(String),

    /// A service line item passed eligibility but matched no pricing branch.
    #[error("anomalous service line item: {0}")]
    AnomalousServiceLineItem(String),

    /// The idempotency lookup against stored invoice lines failed.
    #[error("invoice ledger lookup failed: {0}")]
    Ledger(#[source] LedgerError),

    /// Money arithmetic exceeded the range of `Decimal`.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// A one-time charge was about to be recorded a second time.
    #[error("one-time charge already invoiced for service line item {0}")]
    DuplicateOneTimeCharge(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// A simulation request could not be processed.
    #[error("simulation error: {0}")]
    Simulation(String),
}

/// A single invariant violation with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "lines[0].total").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Short rule identifier if applicable (e.g. "INV-TOTAL").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
