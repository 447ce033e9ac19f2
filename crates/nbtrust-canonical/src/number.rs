//! Float rendering that matches Python's `repr(float)`.
//!
//! Rust and Python both start from the shortest round-trip digit string, so
//! only the layout differs: Python switches to scientific notation when the
//! decimal exponent is below -4 or at least 16, pads the exponent to two
//! digits with an explicit sign, and always shows a fractional part in
//! positional form.

/// Smallest decimal exponent rendered positionally (`1e-4` -> `0.0001`).
const MIN_POSITIONAL_EXPONENT: i32 = -4;
/// First decimal exponent rendered in scientific form (`1e16` -> `1e+16`).
const MAX_POSITIONAL_EXPONENT: i32 = 16;

/// Formats a float exactly as the signing convention expects.
///
/// - `0 < |x| < 1e-4` or `|x| >= 1e16`: `d[.ddd]e±NN`
/// - otherwise positional with a mandatory decimal point
/// - zero of either sign: `0.0`
/// - non-finite: `inf`, `-inf`, `nan`
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let (mantissa, exponent) = shortest_digits(magnitude);

    // Nothing significant survived; never emit a bare exponent.
    if !mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        return "0.0".to_string();
    }

    if exponent < MIN_POSITIONAL_EXPONENT || exponent >= MAX_POSITIONAL_EXPONENT {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.unsigned_abs())
    } else {
        let mut out = format!("{sign}{magnitude}");
        if !out.contains('.') {
            out.push_str(".0");
        }
        out
    }
}

/// Splits the shortest round-trip representation of a positive float into
/// its mantissa text (`d` or `d.ddd`) and decimal exponent.
fn shortest_digits(magnitude: f64) -> (String, i32) {
    let raw = format!("{magnitude:e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}
