//! Elapsed-days calculation and lenient event-date parsing
//!
//! A missing or unreadable event date is the "unknown" state, carried as
//! `None` all the way into the evaluator. It is never treated as "today"
//! or as "long ago".

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Persisted date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_ONLY_FORMATS: &[&str] = &[DATE_FORMAT, "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Whole days from `event` to `today`.
///
/// `None` in, `None` out. Future events give a negative count.
pub fn days_since(event: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    event.map(|d| (today - d).num_days())
}

/// Parse a stored event date, accepting a few common layouts.
///
/// Returns `None` for blank or unreadable text.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in DATE_ONLY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    tracing::debug!("Unreadable event date {:?}, treating as unknown", raw);
    None
}

/// Format a date the way it is persisted
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
