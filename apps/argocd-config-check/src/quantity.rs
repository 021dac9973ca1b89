//! Kubernetes resource quantities (`512Mi`, `2Gi`, `0.5G`, `1e9`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid quantity '{0}'")]
    Invalid(String),
    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

const BINARY_SUFFIXES: [(&str, i32); 6] = [
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
];

const DECIMAL_SUFFIXES: [(&str, i32); 7] = [
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Parse a memory quantity to whole bytes, rounding fractions up.
pub fn parse_memory_to_bytes(raw: &str) -> Result<u64, QuantityError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }
    let invalid = || QuantityError::Invalid(raw.to_string());

    let (number, multiplier) = split_suffix(s).ok_or_else(invalid)?;
    if number.is_empty() || number.starts_with('-') {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    let bytes = (value * multiplier).ceil();
    if bytes < 0.0 || bytes > u64::MAX as f64 {
        return Err(QuantityError::OutOfRange(raw.to_string()));
    }
    Ok(bytes as u64)
}

/// Split `s` into its numeric part and the multiplier of its suffix.
fn split_suffix(s: &str) -> Option<(&str, f64)> {
    for (suffix, exp) in BINARY_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some((number, 2f64.powi(exp)));
        }
    }
    // Decimal exponent form, e.g. 12e6 or 1E3.
    if let Some(pos) = s.find(['e', 'E']) {
        let (mantissa, exp) = (&s[..pos], &s[pos + 1..]);
        if !exp.is_empty() {
            let exp: i32 = exp.parse().ok()?;
            return Some((mantissa, 10f64.powi(exp)));
        }
    }
    for (suffix, exp) in DECIMAL_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some((number, 10f64.powi(exp)));
        }
    }
    if s.ends_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Some((s, 1.0));
    }
    None
}

/// Whole mebibytes in `bytes`, truncated.
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}
