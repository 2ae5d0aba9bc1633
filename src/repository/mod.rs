//! Plant and growth-log storage
//!
//! The evaluator never touches storage; this module supplies the records
//! it is run over. Two backends:
//! - `memory.rs` - `InMemoryStore`, for tests and ephemeral servers
//! - `csv_store.rs` - `CsvStore`, flat `plants.csv` / `growth_logs.csv` files

pub mod memory;
pub mod csv_store;

pub use memory::InMemoryStore;
pub use csv_store::CsvStore;

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::care::PlantObservation;
use crate::species;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("plant {0} not found")]
    NotFound(i64),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("corrupt row {row} in {table}: {reason}")]
    Corrupt {
        table: &'static str,
        row: usize,
        reason: String,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

// ============================================================================
// Records
// ============================================================================

/// A registered plant: identity plus its latest observed state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub plant_type: String,
    pub last_watered: Option<NaiveDate>,
    pub last_fertilized: Option<NaiveDate>,
    pub sunlight_hours: f64,
    pub temp_c: f64,
    pub humidity_percent: f64,
    pub notes: String,
    pub image_path: Option<String>,
    pub added_on: NaiveDate,
}

impl PlantRecord {
    pub fn observation(&self) -> PlantObservation {
        PlantObservation {
            species: self.species.clone(),
            last_watered: self.last_watered,
            last_fertilized: self.last_fertilized,
            sunlight_hours: self.sunlight_hours,
            temp_c: self.temp_c,
            humidity_percent: self.humidity_percent,
        }
    }
}

fn default_sunlight_hours() -> f64 {
    6.0
}

fn default_temp_c() -> f64 {
    25.0
}

fn default_humidity_percent() -> f64 {
    50.0
}

/// Input for registering a plant
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlant {
    // Defaulted so a missing field reaches `validate`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub last_watered: Option<NaiveDate>,
    #[serde(default)]
    pub last_fertilized: Option<NaiveDate>,
    #[serde(default = "default_sunlight_hours")]
    pub sunlight_hours: f64,
    #[serde(default = "default_temp_c")]
    pub temp_c: f64,
    #[serde(default = "default_humidity_percent")]
    pub humidity_percent: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl NewPlant {
    /// Name and species are the only required fields
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() || self.species.trim().is_empty() {
            return Err(StoreError::Validation(
                "please provide at least a name and a species".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the stored record. A known species' type overrides whatever
    /// type was supplied.
    pub fn into_record(self, id: i64, today: NaiveDate) -> Result<PlantRecord, StoreError> {
        self.validate()?;

        let name = self.name.trim().to_string();
        let species = self.species.trim().to_string();
        let plant_type = match species::resolve(&species) {
            (profile, true) => profile.plant_type.to_string(),
            (_, false) => self
                .plant_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| species::DEFAULT_PROFILE.plant_type.to_string()),
        };

        Ok(PlantRecord {
            id,
            name,
            species,
            plant_type,
            last_watered: self.last_watered,
            last_fertilized: self.last_fertilized,
            sunlight_hours: self.sunlight_hours,
            temp_c: self.temp_c,
            humidity_percent: self.humidity_percent,
            notes: self.notes,
            image_path: self.image_path.filter(|p| !p.is_empty()),
            added_on: today,
        })
    }
}

/// One height measurement for a plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub plant_id: i64,
    pub date: NaiveDate,
    pub height_cm: f64,
    pub notes: String,
}

impl GrowthEntry {
    pub fn new(
        plant_id: i64,
        date: NaiveDate,
        height_cm: f64,
        notes: impl Into<String>,
    ) -> Result<Self, StoreError> {
        if !(height_cm >= 0.0) {
            return Err(StoreError::Validation(format!(
                "height must be a non-negative number of centimetres, got {}",
                height_cm
            )));
        }
        Ok(Self {
            plant_id,
            date,
            height_cm,
            notes: notes.into(),
        })
    }
}

// ============================================================================
// Storage traits
// ============================================================================

pub trait PlantRepository: Send + Sync {
    /// Every stored plant, in storage order
    fn load(&self) -> Result<Vec<PlantRecord>, StoreError>;

    /// Insert or replace the record with the same id
    fn save(&self, record: PlantRecord) -> Result<(), StoreError>;

    /// Register a new plant under a fresh id
    fn insert(&self, plant: NewPlant, today: NaiveDate) -> Result<PlantRecord, StoreError>;

    /// Apply `change` to one stored record as a single locked step and
    /// return the updated record
    fn update(
        &self,
        id: i64,
        change: &mut dyn FnMut(&mut PlantRecord),
    ) -> Result<PlantRecord, StoreError>;

    /// Every stored plant, most recently added first
    fn list_all(&self) -> Result<Vec<PlantRecord>, StoreError> {
        let mut records = self.load()?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn get(&self, id: i64) -> Result<PlantRecord, StoreError> {
        self.load()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn mark_watered(&self, id: i64, date: NaiveDate) -> Result<PlantRecord, StoreError> {
        let record = self.update(id, &mut |r| r.last_watered = Some(date))?;
        tracing::info!("Plant {} marked watered on {}", id, date);
        Ok(record)
    }

    fn mark_fertilized(&self, id: i64, date: NaiveDate) -> Result<PlantRecord, StoreError> {
        let record = self.update(id, &mut |r| r.last_fertilized = Some(date))?;
        tracing::info!("Plant {} marked fertilized on {}", id, date);
        Ok(record)
    }
}

pub trait GrowthLog: Send + Sync {
    fn append(&self, entry: GrowthEntry) -> Result<(), StoreError>;

    /// Entries for one plant, oldest first
    fn for_plant(&self, plant_id: i64) -> Result<Vec<GrowthEntry>, StoreError>;
}

/// Stable sort, so plants added the same day keep storage order
pub fn sort_newest_first(records: &mut [PlantRecord]) {
    records.sort_by(|a, b| b.added_on.cmp(&a.added_on));
}

/// Largest stored id plus one, 1 for an empty table
fn next_id(ids: impl Iterator<Item = i64>) -> Result<i64, StoreError> {
    let Some((row, max)) = ids.enumerate().max_by_key(|&(_, id)| id) else {
        return Ok(1);
    };
    max.checked_add(1).ok_or_else(|| StoreError::Corrupt {
        table: "plants",
        row,
        reason: format!("id {} leaves no room for a new id", max),
    })
}
