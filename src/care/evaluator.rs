//! Five-dimension care evaluator
//!
//! Compares one plant's observed state against its species envelope and
//! produces badges plus advisory text. Dimensions are always evaluated in
//! the order water, fertilizer, sunlight, temperature, humidity.
//!
//! `evaluate` is total: every input combination yields a result. Odd
//! readings (negative sunlight, future dates) are compared as-is; input
//! validation is the caller's job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::badges::{Badge, BadgeCategory};
use super::comparator::{compare_to_range, RangeFit};
use crate::species::{self, SpeciesProfile};
use crate::utils::dates::days_since;

/// Days after the last feed before fertilizing is flagged (same for every species)
pub const FERTILIZE_AFTER_DAYS: i64 = 14;

/// Humidity below this (%) gets a misting suggestion
pub const LOW_HUMIDITY_PERCENT: f64 = 30.0;

/// Humidity above this (%) gets an airflow suggestion
pub const HIGH_HUMIDITY_PERCENT: f64 = 85.0;

/// Current state of one plant, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantObservation {
    pub species: String,
    #[serde(default)]
    pub last_watered: Option<NaiveDate>,
    #[serde(default)]
    pub last_fertilized: Option<NaiveDate>,
    pub sunlight_hours: f64,
    pub temp_c: f64,
    pub humidity_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Water,
    Fertilizer,
    Sunlight,
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub dimension: Dimension,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// At most one badge per water/fertilizer/sunlight/temperature dimension
    pub badges: SmallVec<[Badge; 4]>,
    pub recommendations: Vec<Recommendation>,
}

impl EvaluationResult {
    pub fn has_badge(&self, category: BadgeCategory) -> bool {
        self.badges.iter().any(|b| b.category == category)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.recommendations.iter().map(|r| r.message.as_str())
    }

    /// Recommendations for a single dimension, in emitted order
    pub fn for_dimension(&self, dimension: Dimension) -> impl Iterator<Item = &str> {
        self.recommendations
            .iter()
            .filter(move |r| r.dimension == dimension)
            .map(|r| r.message.as_str())
    }

    /// All recommendation messages, one per line (the text handed to polishing)
    pub fn to_text(&self) -> String {
        self.messages().collect::<Vec<_>>().join("\n")
    }

    fn badge(&mut self, category: BadgeCategory) {
        self.badges.push(Badge::new(category));
    }

    fn recommend(&mut self, dimension: Dimension, message: impl Into<String>) {
        self.recommendations.push(Recommendation {
            dimension,
            message: message.into(),
        });
    }
}

/// Evaluate an observation against an explicit profile.
pub fn evaluate(
    observation: &PlantObservation,
    profile: &SpeciesProfile,
    today: NaiveDate,
) -> EvaluationResult {
    let mut result = EvaluationResult::default();

    evaluate_water(&mut result, days_since(observation.last_watered, today), profile);
    evaluate_fertilizer(&mut result, days_since(observation.last_fertilized, today), profile);
    evaluate_sunlight(&mut result, observation.sunlight_hours, profile);
    evaluate_temperature(&mut result, observation.temp_c, profile);
    evaluate_humidity(&mut result, observation.humidity_percent);

    result
}

/// Evaluate using the reference table entry for `observation.species`
/// (default profile when unknown).
pub fn evaluate_species(observation: &PlantObservation, today: NaiveDate) -> EvaluationResult {
    evaluate(observation, species::lookup(&observation.species), today)
}

// ============================================================================
// Dimensions
// ============================================================================

fn evaluate_water(result: &mut EvaluationResult, days: Option<i64>, profile: &SpeciesProfile) {
    let interval = profile.water_interval_days;
    let Some(days) = days else {
        result.recommend(
            Dimension::Water,
            "Last watering date unknown. Set it in the plant profile.",
        );
        return;
    };

    // An interval of 1 gives a threshold of 1 and no "hydrated" window
    let recent_threshold = interval.div_euclid(2).max(1);

    if days >= interval.saturating_add(1) {
        result.badge(BadgeCategory::NeedsWater);
        result.recommend(
            Dimension::Water,
            format!(
                "It has been {} days since last watering. Recommended every {} days.",
                days, interval
            ),
        );
    } else if days <= recent_threshold {
        result.recommend(
            Dimension::Water,
            "You watered very recently. Avoid frequent shallow watering to prevent root rot.",
        );
    } else {
        result.badge(BadgeCategory::Hydrated);
        result.recommend(Dimension::Water, "Hydration looks okay.");
    }
}

fn evaluate_fertilizer(result: &mut EvaluationResult, days: Option<i64>, profile: &SpeciesProfile) {
    match days {
        None => result.recommend(
            Dimension::Fertilizer,
            "Fertilizer history missing. Track the last fertilized date.",
        ),
        Some(days) if days >= FERTILIZE_AFTER_DAYS => {
            result.badge(BadgeCategory::Fertilize);
            result.recommend(
                Dimension::Fertilizer,
                format!("Last fertilized {} days ago. {}.", days, profile.fertilizer),
            );
        }
        Some(_) => result.recommend(Dimension::Fertilizer, "Fertilizer schedule OK."),
    }
}

fn evaluate_sunlight(result: &mut EvaluationResult, hours: f64, profile: &SpeciesProfile) {
    match compare_to_range(hours, profile.sunlight_hours_min, profile.sunlight_hours_max) {
        RangeFit::BelowRange => {
            result.badge(BadgeCategory::LowLight);
            result.recommend(
                Dimension::Sunlight,
                format!(
                    "Current sunlight {}h is below the ideal {}h. Move to a brighter spot (east/west window).",
                    hours, profile.sunlight_hours_min
                ),
            );
        }
        RangeFit::AboveRange => {
            result.badge(BadgeCategory::TooMuchSun);
            result.recommend(
                Dimension::Sunlight,
                format!(
                    "Current sunlight {}h is above the safe {}h. Provide shade or move slightly away from direct noon sun.",
                    hours, profile.sunlight_hours_max
                ),
            );
        }
        RangeFit::WithinRange => {
            result.recommend(Dimension::Sunlight, "Sunlight is within recommended range.")
        }
    }
}

/// No message at all when temperature is in range.
fn evaluate_temperature(result: &mut EvaluationResult, temp_c: f64, profile: &SpeciesProfile) {
    match compare_to_range(temp_c, profile.temp_c_min, profile.temp_c_max) {
        RangeFit::BelowRange => {
            result.badge(BadgeCategory::TooCold);
            result.recommend(
                Dimension::Temperature,
                format!(
                    "Temperature {}°C is below the ideal {}°C. Protect from chill.",
                    temp_c, profile.temp_c_min
                ),
            );
        }
        RangeFit::AboveRange => {
            result.badge(BadgeCategory::TooHot);
            result.recommend(
                Dimension::Temperature,
                format!(
                    "Temperature {}°C is above the ideal {}°C. Improve ventilation and shade.",
                    temp_c, profile.temp_c_max
                ),
            );
        }
        RangeFit::WithinRange => {}
    }
}

fn evaluate_humidity(result: &mut EvaluationResult, humidity: f64) {
    if humidity < LOW_HUMIDITY_PERCENT {
        result.recommend(
            Dimension::Humidity,
            "Low humidity. Consider misting or a humidity tray for tropical species.",
        );
    }
    if humidity > HIGH_HUMIDITY_PERCENT {
        result.recommend(
            Dimension::Humidity,
            "Very high humidity. Ensure good airflow to avoid fungal issues.",
        );
    }
}
