//! Care Report
//!
//! Prints a markdown care card for every plant in the data directory.
//!
//! Run with: cargo run --bin care_report [YYYY-MM-DD]
//! (`DATA_DIR` selects the store, default `data`)

use anyhow::{bail, Context, Result};
use plant_care_rust::care::{advice::generate_plant_card, evaluate_all};
use plant_care_rust::utils::parse_event_date;
use plant_care_rust::{AppConfig, CsvStore, PlantRepository};

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    let today = match std::env::args().nth(1) {
        Some(arg) => match parse_event_date(&arg) {
            Some(date) => date,
            None => bail!("Unreadable date argument {:?}, expected YYYY-MM-DD", arg),
        },
        None => chrono::Local::now().date_naive(),
    };

    let store = CsvStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
    let records = store.list_all().context("Failed to load plants")?;

    println!("# Plant care report for {}\n", today);

    if records.is_empty() {
        println!("No plants added yet.");
        return Ok(());
    }

    for report in evaluate_all(records, today) {
        println!("{}\n", generate_plant_card(&report));
        println!("---\n");
    }

    Ok(())
}
