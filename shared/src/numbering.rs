//! Sequential document numbering for sales delivery notes
//!
//! Sales notes carry a human-readable numero of the form `BL` followed by
//! the counter zero-padded to 5 digits (`BL00001`). The padding is a floor,
//! not a ceiling: once the counter passes 99999 the width simply grows
//! (`BL100000`). Formatting and parsing are pure; the authoritative
//! uniqueness guarantee lives in the database's unique index, not here.

/// Prefix of every sales delivery-note numero
pub const SALES_NUMERO_PREFIX: &str = "BL";

/// Minimum digit width of the counter part
pub const SALES_NUMERO_PAD: usize = 5;

/// Format a counter value as a sales numero, e.g. `1` -> `BL00001`
pub fn format_sales_numero(counter: i64) -> String {
    format!("{}{:0width$}", SALES_NUMERO_PREFIX, counter, width = SALES_NUMERO_PAD)
}

/// Extract the numeric counter from a sales numero
///
/// Returns `None` for anything that is not the prefix followed by
/// decimal digits. Tolerant of widths other than 5 so historically
/// grown numeros (`BL100000`) keep parsing.
pub fn parse_sales_numero(numero: &str) -> Option<i64> {
    let digits = numero.strip_prefix(SALES_NUMERO_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
