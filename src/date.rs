//! Date display for file metadata lines

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Numeric year, two-digit month and day.
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse the calendar date out of an ISO-ish string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Format `raw` with the strftime `pattern`, or hand back `raw` untouched
/// when it is not a date.
pub fn format_date(raw: &str, pattern: &str) -> String {
    match parse_date(raw) {
        Some(date) => {
            let mut out = String::new();
            // An invalid pattern makes the formatter error out instead of
            // panicking through `to_string`.
            if write!(out, "{}", date.format(pattern)).is_ok() {
                out
            } else {
                raw.to_string()
            }
        }
        None => raw.to_string(),
    }
}
