pub mod csv_column;
pub mod text;

/// Coerce one token to a finite number.
/// Accepts plain decimal and exponent notation after trimming. Empty text,
/// words, `NaN` and infinities all yield `None`.
#[inline]
pub fn coerce_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Typed capability check used when scanning CSV fields.
#[inline]
pub fn is_numeric(value: &str) -> bool {
    coerce_number(value).is_some()
}
