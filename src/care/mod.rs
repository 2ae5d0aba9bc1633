//! Care Recommendation Engine
//!
//! Compares a plant's observed state against its species' ideal envelope
//! and derives status badges plus advisory text.
//!
//! ## Architecture
//! - `comparator.rs` - inclusive [min, max] range classification
//! - `badges.rs` - badge categories and severities
//! - `evaluator.rs` - the five-dimension evaluator (pure, total)
//! - `report.rs` - per-plant reports, bulk evaluation with rayon
//! - `advice.rs` - markdown plant cards

pub mod comparator;
pub mod badges;
pub mod evaluator;
pub mod report;
pub mod advice;

// Re-export public API
pub use comparator::{compare_to_range, RangeFit};
pub use badges::{Badge, BadgeCategory, Severity};
pub use evaluator::{
    evaluate,
    evaluate_species,
    Dimension,
    EvaluationResult,
    PlantObservation,
    Recommendation,
    FERTILIZE_AFTER_DAYS,
    HIGH_HUMIDITY_PERCENT,
    LOW_HUMIDITY_PERCENT,
};
pub use report::{evaluate_all, PlantReport};
pub use advice::generate_plant_card;
