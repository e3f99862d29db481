use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BillingError;

/// Cadence at which a service line item's price is quoted and billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BilledType {
    /// One-time charge, billed once per logical line item.
    Once,
    /// Price per month.
    Monthly,
    /// Price per quarter.
    Quarterly,
    /// Price per year.
    Annually,
    /// Consumption based, billed by the metering subsystem.
    Usage,
    /// Not billed.
    None,
}

impl BilledType {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Once => "ONCE",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Annually => "ANNUALLY",
            Self::Usage => "USAGE",
            Self::None => "NONE",
        }
    }

    /// Parse from the wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ONCE" => Some(Self::Once),
            "MONTHLY" => Some(Self::Monthly),
            "QUARTERLY" => Some(Self::Quarterly),
            "ANNUALLY" => Some(Self::Annually),
            "USAGE" => Some(Self::Usage),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Length of the cadence in months, for recurrent types only.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Annually => Some(12),
            Self::Once | Self::Usage | Self::None => None,
        }
    }

    pub fn is_recurrent(&self) -> bool {
        self.months().is_some()
    }

    pub fn is_one_time(&self) -> bool {
        matches!(self, Self::Once)
    }
}

/// Billing cycle of a contract, and therefore of its invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    /// No cycle configured. Cannot be invoiced.
    None,
    Monthly,
    Quarterly,
    Annually,
}

impl BillingCycle {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Annually => "ANNUALLY",
        }
    }

    /// Parse from the wire code.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidBillingCycle`] for unknown codes.
    pub fn from_code(code: &str) -> Result<Self, BillingError> {
        match code {
            "NONE" => Ok(Self::None),
            "MONTHLY" => Ok(Self::Monthly),
            "QUARTERLY" => Ok(Self::Quarterly),
            "ANNUALLY" => Ok(Self::Annually),
            other => Err(BillingError::InvalidBillingCycle(other.to_string())),
        }
    }

    /// Length of the cycle in months; `None` when no cycle is configured.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Annually => Some(12),
        }
    }
}

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Created, not yet filled.
    Initialized,
    /// Filled without any billable line.
    Empty,
    /// Preview of an upcoming invoice.
    Scheduled,
    /// Preview for a contract that is out of contract.
    OnHold,
    /// Issued and awaiting payment.
    Due,
    Paid,
    Void,
}

impl InvoiceStatus {
    /// Status an invoice takes right after being filled.
    ///
    /// Zero lines give `Empty`; dry-run previews are `Scheduled` (or
    /// `OnHold` when the contract is out of contract); real invoices are
    /// `Due`, or `Paid` when there is nothing to pay.
    pub fn after_fill(invoice: &Invoice, contract_status: ContractStatus) -> Self {
        if invoice.lines.is_empty() {
            return Self::Empty;
        }
        if invoice.dry_run && invoice.preview {
            if contract_status == ContractStatus::OutOfContract {
                Self::OnHold
            } else {
                Self::Scheduled
            }
        } else if invoice.total_amount.is_zero() {
            Self::Paid
        } else {
            Self::Due
        }
    }
}

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Draft,
    Scheduled,
    Live,
    OutOfContract,
    Ended,
}

/// A billable entitlement on a contract.
///
/// One logical line item is a chain of versions sharing `parent_id`;
/// editing an item creates a new version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    /// Identifier of this version.
    pub id: String,
    /// Identifier of the version chain.
    pub parent_id: String,
    /// Display name copied onto invoice lines.
    pub name: String,
    pub comments: Option<String>,
    pub billed_type: BilledType,
    /// Unit price quoted at the cadence of `billed_type`.
    pub price: Decimal,
    pub quantity: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// VAT rate in percent (e.g. 19 for 19%).
    pub vat_rate: Decimal,
    /// Only meaningful for one-time items.
    pub canceled: bool,
}

impl ServiceLineItem {
    /// Whether the item is active at `at`: started on or before it and
    /// not ended before it.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.started_at <= at && self.ended_at.is_none_or(|ended| ended >= at)
    }
}

/// One billed service line item on one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub name: String,
    /// Unit price normalized to the invoice's billing cycle.
    pub price: Decimal,
    pub quantity: i64,
    pub amount: Decimal,
    pub vat: Decimal,
    /// Always `amount + vat`.
    pub total: Decimal,
    pub billed_type: BilledType,
    pub service_line_item_id: String,
    /// Key of the idempotency check for one-time items.
    pub service_line_item_parent_id: String,
}

/// One billing period's invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub contract_id: String,
    pub currency: String,
    pub note: Option<String>,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    pub issued_date: NaiveDate,
    pub due_date: NaiveDate,
    pub billing_cycle: BillingCycle,
    /// Billed at the end of the period instead of its start.
    pub postpaid: bool,
    pub dry_run: bool,
    pub preview: bool,
    pub off_cycle: bool,
    pub status: InvoiceStatus,
    pub amount: Decimal,
    pub vat: Decimal,
    /// Always `amount + vat`.
    pub total_amount: Decimal,
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Whether the invoice carries computed lines and totals.
    pub fn is_filled(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// The subset of a contract the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub status: ContractStatus,
    pub billing_cycle: BillingCycle,
    /// Start of the next period to invoice, once invoicing has begun.
    pub next_invoice_date: Option<NaiveDate>,
    /// Start of the very first period.
    pub invoicing_start_date: Option<NaiveDate>,
    /// Contract currency; falls back to the tenant's base currency.
    pub currency: Option<String>,
    pub invoice_note: Option<String>,
    /// Days between issue date and due date.
    pub due_days: u32,
}

impl Contract {
    /// Start of the period the next invoice covers.
    pub fn next_period_start(&self) -> Option<NaiveDate> {
        self.next_invoice_date.or(self.invoicing_start_date)
    }
}

/// Tenant-wide invoicing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub base_currency: String,
    /// Invoices are issued at period end rather than period start.
    pub invoicing_postpaid: bool,
}

/// The latest stored invoice line for a service line item parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicedLine {
    pub invoice_number: String,
    /// Period end of the invoice the line belongs to.
    pub invoice_period_end: NaiveDate,
    pub line: InvoiceLine,
}
