use rand::Rng;

const CONSONANTS: &[u8] = b"BCDFGHJKLMNPQRSTVWXYZ";
const PREFIX_LEN: usize = 3;
const DIGITS_LEN: usize = 5;

/// Random number for a simulated or preview invoice, e.g. `KTW-04817`.
///
/// Preview numbers are not part of the legal numbering sequence and are
/// never persisted by this crate.
pub fn generate_invoice_number() -> String {
    generate_invoice_number_with(&mut rand::thread_rng())
}

/// Like [`generate_invoice_number`] with a caller-supplied generator.
pub fn generate_invoice_number_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix: String = (0..PREFIX_LEN)
        .map(|_| CONSONANTS[rng.gen_range(0..CONSONANTS.len())] as char)
        .collect();
    let digits: String = (0..DIGITS_LEN)
        .map(|_| rng.gen_range(0..10).to_string())
        .collect();
    format!("{prefix}-{digits}")
}

/// Whether `number` has the shape of a generated preview number.
pub fn is_preview_number(number: &str) -> bool {
    let Some((prefix, digits)) = number.split_once('-') else {
        return false;
    };
    prefix.len() == PREFIX_LEN
        && prefix.bytes().all(|b| CONSONANTS.contains(&b))
        && digits.len() == DIGITS_LEN
        && digits.bytes().all(|b| b.is_ascii_digit())
}
