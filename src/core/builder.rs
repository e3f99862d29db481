use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::calendar::try_cycle_end;
use super::error::BillingError;
use super::types::*;

/// Builder for an unfilled invoice covering one billing period.
///
/// ```
/// use zyklus::core::*;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-001", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .billing_cycle(BillingCycle::Monthly)
///     .currency("EUR")
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.period_end_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// ```
pub struct InvoiceBuilder {
    number: String,
    contract_id: String,
    currency: String,
    note: Option<String>,
    period_start: NaiveDate,
    period_end: Option<NaiveDate>,
    issued_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    billing_cycle: BillingCycle,
    postpaid: bool,
    dry_run: bool,
    preview: bool,
    off_cycle: bool,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, period_start: NaiveDate) -> Self {
        Self {
            number: number.into(),
            contract_id: String::new(),
            currency: "USD".to_string(),
            note: None,
            period_start,
            period_end: None,
            issued_date: None,
            due_date: None,
            billing_cycle: BillingCycle::Monthly,
            postpaid: false,
            dry_run: false,
            preview: false,
            off_cycle: false,
        }
    }

    pub fn contract_id(mut self, id: impl Into<String>) -> Self {
        self.contract_id = id.into();
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Explicit period end. Defaults to the end of the billing cycle
    /// starting at the period start.
    pub fn period_end(mut self, date: NaiveDate) -> Self {
        self.period_end = Some(date);
        self
    }

    pub fn issued_date(mut self, date: NaiveDate) -> Self {
        self.issued_date = Some(date);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn billing_cycle(mut self, cycle: BillingCycle) -> Self {
        self.billing_cycle = cycle;
        self
    }

    pub fn postpaid(mut self, postpaid: bool) -> Self {
        self.postpaid = postpaid;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn off_cycle(mut self, off_cycle: bool) -> Self {
        self.off_cycle = off_cycle;
        self
    }

    /// Build the unfilled invoice.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidBillingCycle`] when no period end was
    /// given and the cycle is unsupported, and [`BillingError::Builder`]
    /// when the period ends before it starts.
    pub fn build(self) -> Result<Invoice, BillingError> {
        let period_end = match self.period_end {
            Some(end) => end,
            None => try_cycle_end(self.period_start, self.billing_cycle)?,
        };
        if period_end < self.period_start {
            return Err(BillingError::Builder(format!(
                "period end {period_end} is before period start {}",
                self.period_start
            )));
        }
        if self.number.len() > 200 {
            return Err(BillingError::Builder(
                "invoice number cannot exceed 200 characters".into(),
            ));
        }
        let issued_date = self.issued_date.unwrap_or(self.period_start);

        Ok(Invoice {
            number: self.number,
            contract_id: self.contract_id,
            currency: self.currency,
            note: self.note,
            period_start_date: self.period_start,
            period_end_date: period_end,
            issued_date,
            due_date: self.due_date.unwrap_or(issued_date),
            billing_cycle: self.billing_cycle,
            postpaid: self.postpaid,
            dry_run: self.dry_run,
            preview: self.preview,
            off_cycle: self.off_cycle,
            status: InvoiceStatus::Initialized,
            amount: Decimal::ZERO,
            vat: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            lines: Vec::new(),
        })
    }
}

/// Builder for ServiceLineItem.
pub struct ServiceLineItemBuilder {
    id: String,
    parent_id: Option<String>,
    name: String,
    comments: Option<String>,
    billed_type: BilledType,
    price: Decimal,
    quantity: i64,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    vat_rate: Decimal,
    canceled: bool,
}

impl ServiceLineItemBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        billed_type: BilledType,
        quantity: i64,
        price: Decimal,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            comments: None,
            billed_type,
            price,
            quantity,
            started_at,
            ended_at: None,
            vat_rate: Decimal::ZERO,
            canceled: false,
        }
    }

    /// Version chain id. Defaults to the item's own id.
    pub fn parent_id(mut self, id: impl Into<String>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn ended_at(mut self, at: DateTime<Utc>) -> Self {
        self.ended_at = Some(at);
        self
    }

    pub fn vat_rate(mut self, rate: Decimal) -> Self {
        self.vat_rate = rate;
        self
    }

    pub fn canceled(mut self, canceled: bool) -> Self {
        self.canceled = canceled;
        self
    }

    pub fn build(self) -> ServiceLineItem {
        let parent_id = self.parent_id.unwrap_or_else(|| self.id.clone());
        ServiceLineItem {
            id: self.id,
            parent_id,
            name: self.name,
            comments: self.comments,
            billed_type: self.billed_type,
            price: self.price,
            quantity: self.quantity,
            started_at: self.started_at,
            ended_at: self.ended_at,
            vat_rate: self.vat_rate,
            canceled: self.canceled,
        }
    }
}

/// Builder for Contract.
pub struct ContractBuilder {
    id: String,
    status: ContractStatus,
    billing_cycle: BillingCycle,
    next_invoice_date: Option<NaiveDate>,
    invoicing_start_date: Option<NaiveDate>,
    currency: Option<String>,
    invoice_note: Option<String>,
    due_days: u32,
}

impl ContractBuilder {
    pub fn new(id: impl Into<String>, billing_cycle: BillingCycle) -> Self {
        Self {
            id: id.into(),
            status: ContractStatus::Live,
            billing_cycle,
            next_invoice_date: None,
            invoicing_start_date: None,
            currency: None,
            invoice_note: None,
            due_days: 0,
        }
    }

    pub fn status(mut self, status: ContractStatus) -> Self {
        self.status = status;
        self
    }

    pub fn next_invoice_date(mut self, date: NaiveDate) -> Self {
        self.next_invoice_date = Some(date);
        self
    }

    pub fn invoicing_start_date(mut self, date: NaiveDate) -> Self {
        self.invoicing_start_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn invoice_note(mut self, note: impl Into<String>) -> Self {
        self.invoice_note = Some(note.into());
        self
    }

    pub fn due_days(mut self, days: u32) -> Self {
        self.due_days = days;
        self
    }

    pub fn build(self) -> Contract {
        Contract {
            id: self.id,
            status: self.status,
            billing_cycle: self.billing_cycle,
            next_invoice_date: self.next_invoice_date,
            invoicing_start_date: self.invoicing_start_date,
            currency: self.currency,
            invoice_note: self.invoice_note,
            due_days: self.due_days,
        }
    }
}
