//! Shared helpers
//!
//! - Dates: elapsed-days calculation, lenient parsing of stored dates

pub mod dates;

pub use dates::{days_since, format_date, parse_event_date};
