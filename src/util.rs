// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" CSV number handling so the rest of the
// code can assume clean, typed values.
use chrono::Month;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Strips thousands separators and a leading `$`.
/// - Accepts exponent form such as `1.5e6`.
/// - Returns `None` for anything that cannot be safely parsed, including
///   `inf` and `NaN`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.trim_start_matches('$').replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Item counts sometimes come out of spreadsheet tools as `12.0`; accept
/// those but reject real fractions.
pub fn parse_count_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if let Ok(v) = s.replace(',', "").parse::<i64>() {
        return Some(v);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Round to two decimals for display.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Selector label for a month number, e.g. `3 - March`.
pub fn month_label(month: u32) -> String {
    match u8::try_from(month).ok().and_then(|m| Month::try_from(m).ok()) {
        Some(m) => format!("{} - {}", month, m.name()),
        None => month.to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
