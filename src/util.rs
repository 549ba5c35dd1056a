// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date layouts seen in exported AQI sheets, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Accepts exponent notation (`1e2`, `2.5E1`) as written by numeric
///   exporters, but rejects any other letters, which rules out `NaN`, `inf`
///   and unit suffixes.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !c.eq_ignore_ascii_case(&'e'))
    {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// An AQI reading must be a finite, non-negative number.
pub fn parse_aqi(s: Option<&str>) -> Option<f64> {
    parse_f64_safe(s).filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps: keep only the calendar date.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Split a comma-joined pollutant cell into trimmed, non-empty tokens.
pub fn split_tokens(s: Option<&str>) -> Vec<String> {
    s.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round half up, so `2.5 -> 3` and `124.5 -> 125`. Dashboards built on these
/// numbers round the same way, which keeps exported figures identical.
pub fn round_half_up(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    (n + 0.5).floor() as i64
}

/// Rounded percentage of `part` in `total`; 0 when `total` is 0.
pub fn percent(part: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    round_half_up(part as f64 * 100.0 / total as f64)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
