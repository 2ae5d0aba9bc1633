//! Range Comparator
//!
//! Compares an observed reading against a species' ideal [min, max] range.
//! Both bounds are inclusive.

use serde::Serialize;

/// Where an observed value falls relative to an ideal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeFit {
    /// value < min
    BelowRange,

    /// min <= value <= max
    WithinRange,

    /// value > max
    AboveRange,
}

impl RangeFit {
    pub fn display_text(&self) -> &'static str {
        match self {
            RangeFit::BelowRange => "Below ideal range",
            RangeFit::WithinRange => "Within ideal range",
            RangeFit::AboveRange => "Above ideal range",
        }
    }
}

/// Classify `value` against `[min, max]`.
///
/// No validation: negative or absurd readings go through the same
/// comparisons. NaN fails both comparisons and lands in `WithinRange`.
pub fn compare_to_range(value: f64, min: f64, max: f64) -> RangeFit {
    if value < min {
        RangeFit::BelowRange
    } else if value > max {
        RangeFit::AboveRange
    } else {
        RangeFit::WithinRange
    }
}
