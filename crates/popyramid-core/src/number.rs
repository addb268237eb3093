//! JavaScript-compatible number coercion and printing.
//!
//! CSV cells are coerced the way the unary `+` operator does it, so a malformed count becomes
//! `NaN` instead of an error. Numbers shown to users are printed the way V8 prints them.

use ryu_js::Buffer;

/// Coerces a string to a number with `Number(text)` semantics.
///
/// Leading/trailing whitespace is ignored, the empty string is `0`, `0x`/`0o`/`0b` prefixes are
/// integer literals and anything else that is not a decimal literal is `NaN`.
pub fn js_to_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return radix_literal(digits, radix);
        }
    }

    if !is_decimal_literal(s) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn radix_literal(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut acc = 0.0_f64;
    for ch in digits.chars() {
        let Some(d) = ch.to_digit(radix) else {
            return f64::NAN;
        };
        acc = acc * f64::from(radix) + f64::from(d);
    }
    acc
}

// `str::parse::<f64>` also accepts `inf`/`nan` spellings that JS rejects.
fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mut seen_digit = false;
    let mut seen_dot = false;
    for ch in mantissa.chars() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    if !seen_digit {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// Prints `v` the way `String(v)` does in JavaScript.
pub fn js_number_to_string(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let v = if v == 0.0 { 0.0 } else { v };
    let mut buf = Buffer::new();
    buf.format_finite(v).to_string()
}
