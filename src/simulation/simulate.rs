use chrono::NaiveDate;

use crate::core::{
    BillingError, Contract, Invoice, InvoiceLedger, InvoiceStatus, ServiceLineItem, TenantSettings,
    fill_invoice,
};

use super::request::{SimulatedServiceLine, into_service_line_items};
use super::shell::InvoiceShellBuilder;

/// Compute the next invoice of `contract` from `slis` without persisting it.
///
/// # Errors
///
/// Propagates shell construction and fill errors, including
/// [`BillingError::NoInvoiceLines`].
#[tracing::instrument(skip_all, fields(contract = %contract.id))]
pub async fn simulate<L>(
    ledger: &L,
    contract: &Contract,
    settings: &TenantSettings,
    slis: &[ServiceLineItem],
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let shell = InvoiceShellBuilder::new(contract, settings).build()?;
    fill_with_status(ledger, contract, &shell, slis).await
}

/// Preview of the contract's next invoice.
///
/// Repeated previews for the same period keep the number and dates of
/// `prior` (see [`InvoiceShellBuilder::prior_preview`]).
///
/// # Errors
///
/// Same as [`simulate`].
#[tracing::instrument(skip_all, fields(contract = %contract.id))]
pub async fn preview_next_invoice<L>(
    ledger: &L,
    contract: &Contract,
    settings: &TenantSettings,
    prior: Option<&Invoice>,
    slis: &[ServiceLineItem],
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let mut builder = InvoiceShellBuilder::new(contract, settings).preview(true);
    if let Some(prior) = prior {
        builder = builder.prior_preview(prior);
    }
    let shell = builder.build()?;
    fill_with_status(ledger, contract, &shell, slis).await
}

/// Simulate the next invoice with service lines proposed by the caller
/// in place of the stored ones.
///
/// `today` is the period start when the contract has no invoicing dates.
///
/// # Errors
///
/// Returns [`BillingError::Simulation`] for an empty request, otherwise
/// the same errors as [`simulate`].
#[tracing::instrument(skip_all, fields(contract = %contract.id, lines = lines.len()))]
pub async fn simulate_with_changes<L>(
    ledger: &L,
    contract: &Contract,
    settings: &TenantSettings,
    today: NaiveDate,
    lines: Vec<SimulatedServiceLine>,
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    if lines.is_empty() {
        return Err(BillingError::Simulation("no service lines to simulate".into()));
    }
    let slis = into_service_line_items(lines);
    let shell = InvoiceShellBuilder::new(contract, settings)
        .fallback_start(today)
        .build()?;
    fill_with_status(ledger, contract, &shell, &slis).await
}

async fn fill_with_status<L>(
    ledger: &L,
    contract: &Contract,
    shell: &Invoice,
    slis: &[ServiceLineItem],
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let mut invoice = fill_invoice(ledger, shell, slis).await?;
    invoice.status = InvoiceStatus::after_fill(&invoice, contract.status);
    tracing::debug!(
        invoice = %invoice.number,
        status = ?invoice.status,
        total = %invoice.total_amount,
        "simulated invoice"
    );
    Ok(invoice)
}
