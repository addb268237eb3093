use popyramid_core::number::js_number_to_string;

/// Number text for SVG attributes.
///
/// JS `Number#toString()` form, without `-0` or the float noise of our own arithmetic.
/// Non-finite values print as `0`.
pub(super) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

pub(super) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-9 {
        v = nearest;
    }
    out.push_str(&js_number_to_string(v));
}

pub(super) fn translate(x: f64, y: f64) -> String {
    let mut out = String::from("translate(");
    fmt_into(&mut out, x);
    out.push(',');
    fmt_into(&mut out, y);
    out.push(')');
    out
}

pub(super) fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_strips_noise_and_negative_zero() {
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(1e-12), "0");
        assert_eq!(fmt(657.5), "657.5");
        assert_eq!(fmt(2.0000000000001), "2");
        assert_eq!(fmt(f64::NAN), "0");
        assert_eq!(fmt(1400.0), "1400");
    }

    #[test]
    fn escapes_markup() {
        let mut out = String::new();
        escape_xml_into(&mut out, "a<b & \"c\"");
        assert_eq!(out, "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(translate(10.0, 30.0), "translate(10,30)");
    }
}
