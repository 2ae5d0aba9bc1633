//! Per-plant care reports
//!
//! Joins a stored record with its species envelope and evaluation. Reports
//! for a whole collection are computed in parallel; each evaluation only
//! reads its own record and the static species table.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use super::evaluator::{evaluate, EvaluationResult};
use crate::repository::{sort_newest_first, PlantRecord};
use crate::species::{self, SpeciesProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantReport {
    pub record: PlantRecord,
    /// False when the default profile was substituted
    pub species_matched: bool,
    pub profile: SpeciesProfile,
    pub evaluation: EvaluationResult,
    /// Filled in later by the polishing step, if any
    pub polished: Option<String>,
}

impl PlantReport {
    pub fn build(record: PlantRecord, today: NaiveDate) -> Self {
        let (profile, species_matched) = species::resolve(&record.species);
        let evaluation = evaluate(&record.observation(), profile, today);
        Self {
            record,
            species_matched,
            profile: *profile,
            evaluation,
            polished: None,
        }
    }

    /// Polished text when available, otherwise the plain recommendations
    pub fn advice_text(&self) -> String {
        self.polished
            .clone()
            .unwrap_or_else(|| self.evaluation.to_text())
    }
}

/// Reports for every record, most recently added first
pub fn evaluate_all(records: Vec<PlantRecord>, today: NaiveDate) -> Vec<PlantReport> {
    let mut records = records;
    sort_newest_first(&mut records);

    records
        .into_par_iter()
        .map(|record| PlantReport::build(record, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care::BadgeCategory;
    use crate::repository::NewPlant;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn record(id: i64, species: &str, added: NaiveDate) -> PlantRecord {
        let plant: NewPlant = serde_json::from_value(serde_json::json!({
            "name": format!("plant {}", id),
            "species": species,
            "last_watered": "2024-06-01",
        }))
        .unwrap();
        plant.into_record(id, added).unwrap()
    }

    #[test]
    fn test_build_marks_default_profile() {
        let report = PlantReport::build(record(1, "Ficus", day(1)), day(20));
        assert!(!report.species_matched);
        assert_eq!(report.profile, species::DEFAULT_PROFILE);

        let report = PlantReport::build(record(2, "Tomato", day(1)), day(20));
        assert!(report.species_matched);
        assert!(report.evaluation.has_badge(BadgeCategory::NeedsWater));
    }

    #[test]
    fn test_evaluate_all_order_and_parity() {
        let records = vec![
            record(1, "Tomato", day(1)),
            record(2, "Rose", day(5)),
            record(3, "Basil", day(5)),
            record(4, "Aloe Vera", day(3)),
        ];
        let reports = evaluate_all(records.clone(), day(10));

        let ids: Vec<_> = reports.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);

        for report in &reports {
            let single = PlantReport::build(report.record.clone(), day(10));
            assert_eq!(&single, report);
        }
    }

    #[test]
    fn test_advice_text_prefers_polished() {
        let mut report = PlantReport::build(record(1, "Tomato", day(1)), day(2));
        assert_eq!(report.advice_text(), report.evaluation.to_text());
        report.polished = Some("Water deeply twice a week.".to_string());
        assert_eq!(report.advice_text(), "Water deeply twice a week.");
    }
}
