//! Two-decimal formatting shared by every number in the report.

use std::fmt;

use serde::{Serialize, Serializer};

/// Literal shown wherever a metric or field is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// Round `value` to two decimals, half away from zero.
///
/// Rounding works on the shortest decimal representation of the value, so
/// `1234.565` becomes `1234.57` even though its binary value lies slightly
/// below the midpoint. Negative zero prints as `0.00`.
pub fn fixed2(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    // Digits of the value scaled by 100, plus whether to round up.
    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let frac: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();
    digits.push(frac.first().copied().unwrap_or(0));
    digits.push(frac.get(1).copied().unwrap_or(0));
    let round_up = frac.get(2).is_some_and(|&d| d >= 5);

    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let mut int_digits: String = digits[..split].iter().map(|d| (b'0' + d) as char).collect();
    let frac_digits: String = digits[split..].iter().map(|d| (b'0' + d) as char).collect();
    if int_digits.is_empty() {
        int_digits.push('0');
    }

    let is_zero = digits.iter().all(|&d| d == 0);
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}{int_digits}.{frac_digits}")
}

/// `value` rounded like [`fixed2`], as a number for chart data.
pub fn round2(value: f64) -> f64 {
    fixed2(value).parse().unwrap_or(value)
}

/// A number shown in the report, or the `N/A` sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Figure {
    Value(f64),
    Missing,
}

impl From<Option<f64>> for Figure {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Figure::Value(v),
            _ => Figure::Missing,
        }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Value(v) => f.write_str(&fixed2(*v)),
            Figure::Missing => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Serializes as the formatted text, so templates and exports print the same
/// characters.
impl Serialize for Figure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
