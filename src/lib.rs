//! Plant Care Tracker
//!
//! Rule-based care recommendations for house and garden plants.
//!
//! - `species`: built-in reference table of ideal care envelopes
//! - `utils`: elapsed-days calculation and date parsing
//! - `care`: the five-dimension recommendation engine and report rendering
//! - `polish`: optional rewriting of advice text by an external service
//! - `repository`: plant and growth-log storage (in-memory, CSV)
//! - `config`: environment-driven settings
//! - `api_server`: JSON API (feature `api`)

pub mod species;
pub mod utils;
pub mod care;
pub mod polish;
pub mod repository;
pub mod config;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use species::{lookup, SpeciesProfile, DEFAULT_PROFILE};
pub use utils::dates::days_since;
pub use care::{evaluate, evaluate_all, EvaluationResult, PlantObservation, PlantReport};
pub use polish::{polish_or_original, IdentityPolisher, Polisher};
pub use repository::{CsvStore, GrowthEntry, GrowthLog, InMemoryStore, NewPlant, PlantRecord, PlantRepository, StoreError};
pub use config::AppConfig;

#[cfg(feature = "api")]
pub use api_server::{AppState, create_router};
