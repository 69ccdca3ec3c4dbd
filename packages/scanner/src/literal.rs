//! Conversion of matched numeric literals to values.

/// Parses a literal such as `"1,234.56"` or `"-12.5"` into an `f64`,
/// stripping comma group separators.
///
/// Returns `None` if the literal is not a finite number once separators are
/// removed.
#[must_use]
pub fn parse_literal(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Number of digits before the decimal point, ignoring sign and separators.
#[must_use]
pub fn integer_digits(raw: &str) -> usize {
    raw.split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .count()
}
