//! Source-text field parsing.
//!
//! Date parsers return `None` on malformed input so the caller can reject the
//! row. Numeric parsers return `None` for empty or malformed input too, and
//! that `None` is stored as NULL.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_ONLY: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a point in time. Offsets are normalised to UTC; a bare date is midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, DATE_ONLY)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a calendar date. Timestamp input keeps only its date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_ONLY)
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date()))
}

pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // decimal readings truncate toward zero: "72.5" reads as 72
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() < i64::MAX as f64 => Some(v.trunc() as i64),
        _ => {
            tracing::debug!(value = s, "Unparsable integer stored as absent");
            None
        }
    }
}

pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            tracing::debug!(value = s, "Unparsable number stored as absent");
            None
        }
    }
}

/// Empty text is absent.
pub fn optional_text(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
