//! Species Reference Table
//!
//! Static ideal-care envelopes for the built-in species, plus the default
//! envelope substituted for anything not in the table.
//!
//! Keys are case-sensitive ("Tomato" matches, "tomato" does not).

use serde::Serialize;

/// Ideal care envelope for one species
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeciesProfile {
    pub species: &'static str,
    pub plant_type: &'static str,

    /// Days between waterings
    pub water_interval_days: i64,

    /// Sunlight hours per day (inclusive range)
    pub sunlight_hours_min: f64,
    pub sunlight_hours_max: f64,

    /// Temperature in °C (inclusive range)
    pub temp_c_min: f64,
    pub temp_c_max: f64,

    pub soil: &'static str,
    pub fertilizer: &'static str,
}

// ============================================================================
// EMBEDDED SPECIES DATA
// ============================================================================

static SPECIES_PROFILES: &[SpeciesProfile] = &[
    SpeciesProfile {
        species: "Tomato",
        plant_type: "Vegetable",
        water_interval_days: 2,
        sunlight_hours_min: 6.0,
        sunlight_hours_max: 8.0,
        temp_c_min: 18.0,
        temp_c_max: 27.0,
        soil: "Loamy, well-draining",
        fertilizer: "Balanced NPK every 2 weeks during growing season",
    },
    SpeciesProfile {
        species: "Rose",
        plant_type: "Flower",
        water_interval_days: 3,
        sunlight_hours_min: 5.0,
        sunlight_hours_max: 8.0,
        temp_c_min: 10.0,
        temp_c_max: 25.0,
        soil: "Loamy, slightly acidic",
        fertilizer: "High-P potassium fertilizer once a month during bloom",
    },
    SpeciesProfile {
        species: "Snake Plant",
        plant_type: "Indoor - Low Light",
        water_interval_days: 21,
        sunlight_hours_min: 1.0,
        sunlight_hours_max: 4.0,
        temp_c_min: 15.0,
        temp_c_max: 30.0,
        soil: "Sandy, well-draining",
        fertilizer: "Very light during spring",
    },
    SpeciesProfile {
        species: "Aloe Vera",
        plant_type: "Succulent",
        water_interval_days: 21,
        sunlight_hours_min: 3.0,
        sunlight_hours_max: 6.0,
        temp_c_min: 15.0,
        temp_c_max: 30.0,
        soil: "Cactus mix, excellent drainage",
        fertilizer: "Light succulent fertilizer in spring",
    },
    SpeciesProfile {
        species: "Basil",
        plant_type: "Herb",
        water_interval_days: 3,
        sunlight_hours_min: 4.0,
        sunlight_hours_max: 8.0,
        temp_c_min: 18.0,
        temp_c_max: 30.0,
        soil: "Moist, well-draining",
        fertilizer: "Every 3-4 weeks with balanced fertilizer",
    },
];

/// Envelope used for any species missing from the table
pub static DEFAULT_PROFILE: SpeciesProfile = SpeciesProfile {
    species: "Unknown",
    plant_type: "Unknown",
    water_interval_days: 3,
    sunlight_hours_min: 3.0,
    sunlight_hours_max: 8.0,
    temp_c_min: 10.0,
    temp_c_max: 30.0,
    soil: "Unknown",
    fertilizer: "Follow package instructions",
};

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Profile for a species, or the default profile when it is not in the table.
pub fn lookup(species: &str) -> &'static SpeciesProfile {
    resolve(species).0
}

/// Whether the species has its own entry in the table
pub fn contains(species: &str) -> bool {
    find(species).is_some()
}

/// Profile plus whether it was a direct match (false = default substituted)
pub fn resolve(species: &str) -> (&'static SpeciesProfile, bool) {
    match find(species) {
        Some(profile) => (profile, true),
        None => {
            tracing::debug!("Species {:?} not in reference table, using default profile", species);
            (&DEFAULT_PROFILE, false)
        }
    }
}

/// All built-in profiles, in table order
pub fn all() -> &'static [SpeciesProfile] {
    SPECIES_PROFILES
}

/// Built-in species names, in table order
pub fn names() -> impl Iterator<Item = &'static str> {
    SPECIES_PROFILES.iter().map(|p| p.species)
}

fn find(species: &str) -> Option<&'static SpeciesProfile> {
    SPECIES_PROFILES.iter().find(|p| p.species == species)
}
