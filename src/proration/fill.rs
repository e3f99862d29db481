use rust_decimal::Decimal;

use crate::core::pricing::{checked_sum, vat_for};
use crate::core::{
    BilledType, BillingCycle, BillingError, Invoice, InvoiceLedger, InvoiceLine, ServiceLineItem,
    normalized_unit_price, start_of_day_utc, truncate_2dp,
};

use super::period::{annualized_amount, prorate_annual_amount};

/// Fill an off-cycle prepaid invoice.
///
/// Only items started before the period start are considered. Per parent
/// id, the latest version active at the period start is billed: one-time
/// items in full, recurrent items prorated from their start date to the
/// period end, less the prorated amount of a regular invoice that already
/// covers the same cycle.
///
/// # Errors
///
/// Returns [`BillingError::NoInvoiceLines`] when nothing is left to bill,
/// [`BillingError::Ledger`] when a ledger lookup fails and
/// [`BillingError::Overflow`] when an amount exceeds the `Decimal` range.
#[tracing::instrument(
    skip_all,
    fields(
        invoice = %invoice.number,
        period_start = %invoice.period_start_date,
        period_end = %invoice.period_end_date,
    )
)]
pub async fn fill_off_cycle_invoice<L>(
    ledger: &L,
    invoice: &Invoice,
    slis: &[ServiceLineItem],
) -> Result<Invoice, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let reference = start_of_day_utc(invoice.period_start_date);

    let mut candidates = Vec::new();
    for sli in slis {
        if !matches!(
            sli.billed_type,
            BilledType::Once | BilledType::Monthly | BilledType::Quarterly | BilledType::Annually
        ) {
            continue;
        }
        if sli.started_at >= reference {
            continue;
        }
        if sli.billed_type.is_one_time() {
            if sli.quantity <= 0 || sli.price.is_zero() || sli.canceled {
                continue;
            }
            if already_invoiced(ledger, &sli.parent_id).await? {
                continue;
            }
        }
        candidates.push(sli);
    }
    candidates.sort_by_key(|sli| sli.started_at);
    tracing::debug!(candidates = candidates.len(), "service line items to prorate");

    let mut groups: Vec<(&str, Vec<&ServiceLineItem>)> = Vec::new();
    for sli in candidates {
        match groups.iter_mut().find(|(parent, _)| *parent == sli.parent_id) {
            Some((_, versions)) => versions.push(sli),
            None => groups.push((sli.parent_id.as_str(), vec![sli])),
        }
    }

    let mut lines = Vec::new();
    let mut amount = Decimal::ZERO;
    let mut vat = Decimal::ZERO;

    for (parent_id, versions) in groups {
        let Some(sli) = versions.into_iter().rev().find(|sli| sli.is_active_at(reference)) else {
            tracing::debug!(parent = parent_id, "no version active at period start");
            continue;
        };

        let line_amount = if sli.billed_type.is_one_time() {
            Decimal::from(sli.quantity)
                .checked_mul(sli.price)
                .map(truncate_2dp)
                .ok_or_else(|| overflow(sli))?
        } else {
            prorated_amount(ledger, sli, invoice).await?
        };
        if line_amount <= Decimal::ZERO {
            tracing::debug!(sli = %sli.id, %line_amount, "nothing left to charge");
            continue;
        }

        let line_vat = vat_for(line_amount, sli.vat_rate).ok_or_else(|| overflow(sli))?;
        let price = normalized_unit_price(sli.price, sli.billed_type, invoice.billing_cycle)
            .ok_or_else(|| overflow(sli))?;
        amount = checked_sum(amount, line_amount, "invoice amount")?;
        vat = checked_sum(vat, line_vat, "invoice VAT")?;
        lines.push(InvoiceLine {
            name: sli.name.clone(),
            price: truncate_2dp(price),
            quantity: sli.quantity,
            amount: line_amount,
            vat: line_vat,
            total: checked_sum(line_amount, line_vat, "line total")?,
            billed_type: sli.billed_type,
            service_line_item_id: sli.id.clone(),
            service_line_item_parent_id: sli.parent_id.clone(),
        });
    }

    if lines.is_empty() {
        return Err(BillingError::NoInvoiceLines);
    }

    let total_amount = checked_sum(amount, vat, "invoice total")?;
    tracing::debug!(lines = lines.len(), %amount, %vat, "off-cycle invoice filled");
    Ok(Invoice {
        amount,
        vat,
        total_amount,
        lines,
        off_cycle: true,
        ..invoice.clone()
    })
}

fn overflow(sli: &ServiceLineItem) -> BillingError {
    BillingError::Overflow(format!("amounts of service line item {}", sli.id))
}

async fn already_invoiced<L>(ledger: &L, parent_id: &str) -> Result<bool, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let previous = ledger
        .latest_invoice_line_by_parent_id(parent_id)
        .await
        .map_err(BillingError::Ledger)?;
    Ok(previous.is_some())
}

/// Prorated charge for a recurrent item, net of what a regular invoice
/// for the same cycle already billed.
async fn prorated_amount<L>(
    ledger: &L,
    sli: &ServiceLineItem,
    invoice: &Invoice,
) -> Result<Decimal, BillingError>
where
    L: InvoiceLedger + ?Sized,
{
    let started = sli.started_at.date_naive();
    let period_end = invoice.period_end_date;

    let previous = ledger
        .latest_invoice_line_by_parent_id(&sli.parent_id)
        .await
        .map_err(BillingError::Ledger)?;

    // A previous invoice for an earlier cycle does not overlap this one.
    let already_billed = match previous {
        Some(previous) if previous.invoice_period_end >= period_end => {
            // The stored price was already converted to the invoice cycle,
            // so it is annualized from that cycle and not from the line's
            // billed type.
            annualized_line(&previous.line, invoice.billing_cycle)
                .and_then(|annual| prorate_annual_amount(started, period_end, annual))
                .map(truncate_2dp)
                .ok_or_else(|| overflow(sli))?
        }
        _ => Decimal::ZERO,
    };

    let prorated = annualized_amount(sli.quantity, sli.price, sli.billed_type)
        .and_then(|annual| prorate_annual_amount(started, period_end, annual))
        .map(truncate_2dp)
        .ok_or_else(|| overflow(sli))?;
    tracing::debug!(sli = %sli.id, %prorated, %already_billed, "prorated recurrent item");
    prorated
        .checked_sub(already_billed)
        .ok_or_else(|| overflow(sli))
}

/// Yearly amount of a stored line. Stored prices are per billing cycle.
fn annualized_line(line: &InvoiceLine, cycle: BillingCycle) -> Option<Decimal> {
    match cycle.months() {
        Some(months) => Decimal::from(line.quantity)
            .checked_mul(line.price)?
            .checked_mul(Decimal::from(12 / months)),
        None => Some(Decimal::ZERO),
    }
}
