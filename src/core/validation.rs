use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::Invoice;

/// Check the arithmetic invariants of a filled invoice.
///
/// Returns all violations (not just the first):
/// - INV-LINES: a filled invoice has at least one line
/// - LINE-TOTAL: every line total equals amount + VAT
/// - INV-AMOUNT / INV-VAT: invoice amount and VAT equal the line sums
/// - INV-TOTAL: total amount equals amount + VAT
/// - DEC-2: no money field carries more than 2 decimal places
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "invoice has no lines",
            "INV-LINES",
        ));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        let prefix = format!("lines[{i}]");
        if line.amount.checked_add(line.vat) != Some(line.total) {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.total"),
                format!(
                    "line total {} does not match amount {} + vat {}",
                    line.total, line.amount, line.vat
                ),
                "LINE-TOTAL",
            ));
        }
        check_decimal_places(&line.amount, &format!("{prefix}.amount"), &mut errors);
        check_decimal_places(&line.vat, &format!("{prefix}.vat"), &mut errors);
        check_decimal_places(&line.total, &format!("{prefix}.total"), &mut errors);
    }

    let line_amounts = checked_total(invoice.lines.iter().map(|l| l.amount));
    if line_amounts != Some(invoice.amount) {
        errors.push(ValidationError::with_rule(
            "amount",
            format!(
                "invoice amount {} does not match sum of line amounts {}",
                invoice.amount,
                display_sum(line_amounts)
            ),
            "INV-AMOUNT",
        ));
    }

    let line_vat = checked_total(invoice.lines.iter().map(|l| l.vat));
    if line_vat != Some(invoice.vat) {
        errors.push(ValidationError::with_rule(
            "vat",
            format!(
                "invoice VAT {} does not match sum of line VAT {}",
                invoice.vat,
                display_sum(line_vat)
            ),
            "INV-VAT",
        ));
    }

    if invoice.amount.checked_add(invoice.vat) != Some(invoice.total_amount) {
        errors.push(ValidationError::with_rule(
            "total_amount",
            format!(
                "total amount {} does not match amount {} + vat {}",
                invoice.total_amount, invoice.amount, invoice.vat
            ),
            "INV-TOTAL",
        ));
    }

    check_decimal_places(&invoice.amount, "amount", &mut errors);
    check_decimal_places(&invoice.vat, "vat", &mut errors);
    check_decimal_places(&invoice.total_amount, "total_amount", &mut errors);

    errors
}

fn checked_total(mut values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

fn display_sum(sum: Option<Decimal>) -> String {
    sum.map_or_else(|| "out of range".to_string(), |s| s.to_string())
}

fn check_decimal_places(value: &Decimal, field: &str, errors: &mut Vec<ValidationError>) {
    let rounded = value.round_dp(2);
    if *value != rounded {
        errors.push(ValidationError::with_rule(
            field,
            format!("amount {} has more than 2 decimal places", value),
            "DEC-2",
        ));
    }
}
