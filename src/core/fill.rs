//! Turns a contract's service line items into invoice lines and totals.

use rust_decimal::Decimal;

use super::calendar::{end_of_day_utc, reference_time};
use super::eligibility::check_eligibility;
use super::error::BillingError;
use super::ledger::InvoiceLedger;
use super::pricing::{LineAmounts, checked_sum, one_time_amounts, recurrent_amounts};
use super::types::{BilledType, Invoice, InvoiceLine, ServiceLineItem};

/// Result of pricing a single eligible service line item.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The item produces this line.
    Billed(InvoiceLine),
    /// One-time charge already present on an invoice of the contract.
    AlreadyInvoiced,
    /// No pricing branch applies; the item must be left out.
    Anomalous,
}

/// Price one service line item for `invoice`.
///
/// One-time items are looked up in `ledger` by parent id first and are
/// skipped when any invoice already carries them. Recurrent items are
/// converted to the invoice's billing cycle.
///
/// # Errors
///
/// Returns [`BillingError::Ledger`] when the ledger lookup fails and
/// [`BillingError::Overflow`] when the amounts exceed the `Decimal` range.
pub async fn compute_line<L>(
    ledger: &L,
    sli: &ServiceLineItem,
    invoice: &Invoice,
) -> Result<LineOutcome, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let amounts = match sli.billed_type {
        BilledType::Once => {
            let billed = ledger
                .latest_invoice_line_by_parent_id(&sli.parent_id)
                .await
                .map_err(BillingError::Ledger)?;
            if let Some(previous) = billed {
                tracing::debug!(
                    sli = %sli.id,
                    parent = %sli.parent_id,
                    previous_invoice = %previous.invoice_number,
                    "one-time charge already invoiced"
                );
                return Ok(LineOutcome::AlreadyInvoiced);
            }
            one_time_amounts(sli.quantity, sli.price, sli.vat_rate)
        }
        BilledType::Monthly | BilledType::Quarterly | BilledType::Annually => recurrent_amounts(
            sli.quantity,
            sli.price,
            sli.billed_type,
            invoice.billing_cycle,
            sli.vat_rate,
        ),
        BilledType::Usage | BilledType::None => return Ok(LineOutcome::Anomalous),
    };
    let amounts = amounts.ok_or_else(|| {
        BillingError::Overflow(format!("amounts of service line item {}", sli.id))
    })?;
    Ok(LineOutcome::Billed(invoice_line(sli, amounts)))
}

/// Build the invoice line for `sli` from computed amounts.
pub fn invoice_line(sli: &ServiceLineItem, amounts: LineAmounts) -> InvoiceLine {
    InvoiceLine {
        name: sli.name.clone(),
        price: amounts.unit_price,
        quantity: sli.quantity,
        amount: amounts.amount,
        vat: amounts.vat,
        total: amounts.total,
        billed_type: sli.billed_type,
        service_line_item_id: sli.id.clone(),
        service_line_item_parent_id: sli.parent_id.clone(),
    }
}

/// Fill `invoice` with lines for every eligible, not yet billed service
/// line item and compute its totals.
///
/// The input invoice is left untouched; the filled copy is returned.
/// `amount` and `vat` are sums of already truncated line values and
/// `total_amount` is `amount + vat`.
///
/// # Errors
///
/// Returns [`BillingError::NoInvoiceLines`] when nothing is billable,
/// [`BillingError::Ledger`] when an idempotency lookup fails and
/// [`BillingError::Overflow`] when a line or the totals exceed the
/// `Decimal` range.
#[tracing::instrument(
    skip_all,
    fields(
        invoice = %invoice.number,
        period_start = %invoice.period_start_date,
        period_end = %invoice.period_end_date,
        postpaid = invoice.postpaid,
    )
)]
pub async fn fill_invoice<L>(
    ledger: &L,
    invoice: &Invoice,
    slis: &[ServiceLineItem],
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let reference = reference_time(invoice);
    let period_end = end_of_day_utc(invoice.period_end_date);

    let mut lines = Vec::new();
    let mut amount = Decimal::ZERO;
    let mut vat = Decimal::ZERO;

    for sli in slis {
        if let Err(reason) = check_eligibility(sli, reference, period_end) {
            tracing::debug!(sli = %sli.id, %reason, "service line item excluded");
            continue;
        }
        match compute_line(ledger, sli, invoice).await? {
            LineOutcome::Billed(line) => {
                amount = checked_sum(amount, line.amount, "invoice amount")?;
                vat = checked_sum(vat, line.vat, "invoice VAT")?;
                lines.push(line);
            }
            LineOutcome::AlreadyInvoiced => {}
            LineOutcome::Anomalous => {
                let err = BillingError::AnomalousServiceLineItem(sli.id.clone());
                tracing::error!(
                    sli = %sli.id,
                    billed_type = sli.billed_type.code(),
                    error = %err,
                    "service line item left off invoice"
                );
            }
        }
    }

    if lines.is_empty() {
        return Err(BillingError::NoInvoiceLines);
    }

    let total_amount = checked_sum(amount, vat, "invoice total")?;
    tracing::debug!(lines = lines.len(), %amount, %vat, "invoice filled");
    Ok(Invoice {
        amount,
        vat,
        total_amount,
        lines,
        ..invoice.clone()
    })
}
