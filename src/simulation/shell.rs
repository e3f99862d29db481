use chrono::{Days, NaiveDate};

use crate::core::{
    BillingError, Contract, Invoice, InvoiceBuilder, InvoiceStatus, TenantSettings, try_cycle_end,
};

use super::numbering::generate_invoice_number;

/// Builds the unfilled invoice for a contract's next billing period.
///
/// ```
/// use chrono::NaiveDate;
/// use zyklus::core::*;
/// use zyklus::simulation::InvoiceShellBuilder;
///
/// let contract = ContractBuilder::new("c1", BillingCycle::Monthly)
///     .invoicing_start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .due_days(14)
///     .build();
/// let settings = TenantSettings { base_currency: "EUR".into(), invoicing_postpaid: false };
///
/// let shell = InvoiceShellBuilder::new(&contract, &settings).build().unwrap();
/// assert_eq!(shell.period_end_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// assert_eq!(shell.due_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(shell.currency, "EUR");
/// ```
pub struct InvoiceShellBuilder<'a> {
    contract: &'a Contract,
    settings: &'a TenantSettings,
    prior_preview: Option<&'a Invoice>,
    fallback_start: Option<NaiveDate>,
    created_on: Option<NaiveDate>,
    number: Option<String>,
    dry_run: bool,
    preview: bool,
}

impl<'a> InvoiceShellBuilder<'a> {
    pub fn new(contract: &'a Contract, settings: &'a TenantSettings) -> Self {
        Self {
            contract,
            settings,
            prior_preview: None,
            fallback_start: None,
            created_on: None,
            number: None,
            dry_run: true,
            preview: false,
        }
    }

    /// Previously generated preview for the same contract. Its number and
    /// dates are kept when it covers the same period and is still unfilled.
    ///
    /// Pass the stored unfilled shell, not the filled result of
    /// [`preview_next_invoice`](super::preview_next_invoice): a filled
    /// preview is `Scheduled` or `OnHold` and is never reused.
    pub fn prior_preview(mut self, invoice: &'a Invoice) -> Self {
        self.prior_preview = Some(invoice);
        self
    }

    /// Period start used when the contract has no invoicing dates.
    pub fn fallback_start(mut self, date: NaiveDate) -> Self {
        self.fallback_start = Some(date);
        self
    }

    /// Issue date of a shell that is not a dry run. Defaults to the
    /// period start.
    pub fn created_on(mut self, date: NaiveDate) -> Self {
        self.created_on = Some(date);
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Defaults to `true`.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Build the shell.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Builder`] when no period start is known and
    /// [`BillingError::InvalidBillingCycle`] when the contract has no
    /// billing cycle.
    pub fn build(self) -> Result<Invoice, BillingError> {
        let contract = self.contract;
        let period_start = contract
            .next_period_start()
            .or(self.fallback_start)
            .ok_or_else(|| {
                BillingError::Builder(format!(
                    "contract {} has no next invoice date or invoicing start date",
                    contract.id
                ))
            })?;
        let period_end = try_cycle_end(period_start, contract.billing_cycle)?;
        let postpaid = self.settings.invoicing_postpaid;

        let reusable = self.prior_preview.filter(|prior| {
            prior.preview
                && prior.status == InvoiceStatus::Initialized
                && prior.period_start_date == period_start
        });

        let (number, issued_date, due_date) = match reusable {
            Some(prior) => (prior.number.clone(), prior.issued_date, prior.due_date),
            None => {
                let issued = match (self.dry_run, postpaid) {
                    (true, true) => add_days(period_end, 1)?,
                    (true, false) => period_start,
                    (false, _) => self.created_on.unwrap_or(period_start),
                };
                let due = add_days(issued, u64::from(contract.due_days))?;
                let number = self.number.unwrap_or_else(generate_invoice_number);
                (number, issued, due)
            }
        };

        let currency = contract
            .currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.settings.base_currency.clone());

        let mut builder = InvoiceBuilder::new(number, period_start)
            .contract_id(contract.id.clone())
            .currency(currency)
            .period_end(period_end)
            .issued_date(issued_date)
            .due_date(due_date)
            .billing_cycle(contract.billing_cycle)
            .postpaid(postpaid)
            .dry_run(self.dry_run)
            .preview(self.preview);
        if let Some(note) = &contract.invoice_note {
            builder = builder.note(note.clone());
        }
        builder.build()
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, BillingError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| BillingError::Builder(format!("{date} + {days} days is out of range")))
}
