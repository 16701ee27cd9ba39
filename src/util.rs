// Utility helpers for parsing, rounding and log formatting.
//
// Source files coerce loosely (blank cells, stray text in count columns), so
// the lenient parsing lives here and the rest of the code sees typed values.
use num_format::{Locale, ToFormattedString};
use std::path::Path;

/// Parse a string-like value into `f64`, forgiving the formatting noise common
/// in statistical exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric coercion for count columns: anything unparseable counts as zero,
/// fractional parts are truncated.
pub fn coerce_count(s: Option<&str>) -> i64 {
    parse_f64_safe(s).map(|v| v as i64).unwrap_or(0)
}

/// Round to `decimals` places, ties to even (0.25 -> 0.2, 0.75 -> 0.8).
///
/// Applying it to an already rounded value returns the same value.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round_ties_even() / factor;
    if rounded == 0.0 {
        // avoid -0.0 in the JSON
        0.0
    } else {
        rounded
    }
}

/// `part / whole * 100` rounded to one decimal; 0 when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round_to(part / whole * 100.0, 1)
    } else {
        0.0
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Size of a written file in KB, 0 if it can't be read back.
pub fn file_size_kb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_safe_rejects_text_and_blanks() {
        assert_eq!(parse_f64_safe(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n.d.")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn coerce_count_defaults_to_zero() {
        assert_eq!(coerce_count(Some("42")), 42);
        assert_eq!(coerce_count(Some("42.9")), 42);
        assert_eq!(coerce_count(Some("..")), 0);
        assert_eq!(coerce_count(None), 0);
    }

    #[test]
    fn rounding_twice_is_the_same_as_rounding_once() {
        for v in [0.0, 1.005, 2.675, 33.333333, 49.99999, 123456.789, -7.45] {
            for d in [0, 1, 2] {
                let once = round_to(v, d);
                assert_eq!(round_to(once, d), once, "value {v} decimals {d}");
            }
        }
    }

    #[test]
    fn ties_round_to_the_even_digit() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.75, 1), 0.8);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(-0.4, 0), 0.0);
        assert!(round_to(-0.4, 0).is_sign_positive());
    }

    #[test]
    fn percentage_is_zero_without_a_positive_whole() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(2.0, 3.0), 66.7);
    }

    #[test]
    fn format_int_uses_thousands_separators() {
        assert_eq!(format_int(818832), "818,832");
    }
}
