//! SI-prefix tick labels (d3-format `"s"` as chosen by a linear scale's `tickFormat`).
//!
//! All ticks of one axis share the prefix of the largest domain endpoint; the number of
//! fractional digits is just enough to tell adjacent ticks apart.

use crate::scale::tick_step;

const PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SiPrefixFormat {
    /// Power of ten removed from every value (a multiple of 3).
    pub exponent: i32,
    pub precision: usize,
    pub prefix: &'static str,
}

impl SiPrefixFormat {
    pub fn for_ticks(start: f64, stop: f64, count: f64) -> Self {
        let step = tick_step(start, stop, count);
        let value = start.abs().max(stop.abs());
        let precision = precision_prefix(step, value).unwrap_or(6);
        Self::with_precision(value, precision)
    }

    pub fn with_precision(value: f64, precision: usize) -> Self {
        let e = exponent(value).map_or(0, |e| (e.div_euclid(3)).clamp(-8, 8) * 3);
        Self {
            exponent: e,
            precision: precision.min(20),
            prefix: PREFIXES[(8 + e / 3) as usize],
        }
    }

    pub fn format(&self, v: f64) -> String {
        let k = 10f64.powi(-self.exponent);
        let scaled = k * v;
        if scaled.is_nan() {
            return "NaN".to_string();
        }
        let body = to_fixed(scaled.abs(), self.precision);
        let negative = scaled < 0.0 && body.bytes().any(|b| (b'1'..=b'9').contains(&b));
        let sign = if negative { "\u{2212}" } else { "" };
        format!("{sign}{body}{}", self.prefix)
    }
}

/// Decimal exponent of `x` in scientific notation (`toExponential`).
fn exponent(x: f64) -> Option<i32> {
    if !x.is_finite() {
        return None;
    }
    let s = format!("{:e}", x.abs());
    s.split_once('e')?.1.parse().ok()
}

fn precision_prefix(step: f64, value: f64) -> Option<usize> {
    let value_exp = exponent(value)?;
    let step_exp = exponent(step.abs())?;
    let e = value_exp.div_euclid(3).clamp(-8, 8) * 3;
    Some((e - step_exp).max(0) as usize)
}

/// `Number#toFixed`: round half away from zero on the exact binary value.
fn to_fixed(x: f64, digits: usize) -> String {
    if !x.is_finite() {
        return if x > 0.0 { "Infinity" } else { "NaN" }.to_string();
    }

    // The exact expansion is long enough to decide every tie correctly.
    let exact = format!("{:.*}", digits + 30, x);
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    let round_up = frac_part.as_bytes().get(digits).is_some_and(|&b| b >= b'5');

    if round_up {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 1);
    out.push_str(std::str::from_utf8(&kept[..split]).unwrap_or("0"));
    if digits > 0 {
        out.push('.');
        out.push_str(std::str::from_utf8(&kept[split..]).unwrap_or(""));
    }
    out
}
