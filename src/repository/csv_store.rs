//! Flat-file store
//!
//! Two CSV tables in a data directory:
//! - `plants.csv`: id,name,species,type,last_watered,last_fertilized,
//!   sunlight_hours,temp_c,humidity_percent,notes,image_path,added_on
//! - `growth_logs.csv`: plant_id,date,height_cm,notes
//!
//! Every write rewrites the whole table (via a temp file + rename). Tables
//! are read with all columns as text so hand-edited or legacy files load
//! without schema inference surprises: blank numbers read as 0, blank or
//! unreadable dates read as unknown.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use polars::prelude::*;

use super::{next_id, GrowthEntry, GrowthLog, NewPlant, PlantRecord, PlantRepository, StoreError};
use crate::utils::dates::{format_date, parse_event_date};

pub const PLANTS_FILE: &str = "plants.csv";
pub const GROWTH_FILE: &str = "growth_logs.csv";

const PLANTS_TABLE: &str = "plants";
const GROWTH_TABLE: &str = "growth_logs";

pub struct CsvStore {
    data_dir: PathBuf,
    /// Serialises read-modify-write cycles
    write_lock: Mutex<()>,
}

impl CsvStore {
    /// Open (creating if needed) a data directory
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
            path: data_dir.clone(),
            source,
        })?;

        tracing::info!("Using CSV store at {}", data_dir.display());
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn plants_path(&self) -> PathBuf {
        self.data_dir.join(PLANTS_FILE)
    }

    pub fn growth_path(&self) -> PathBuf {
        self.data_dir.join(GROWTH_FILE)
    }

    fn read_plants(&self) -> Result<Vec<PlantRecord>, StoreError> {
        let Some(df) = read_table(&self.plants_path())? else {
            return Ok(Vec::new());
        };

        let ids = text_column(&df, "id");
        let names = text_column(&df, "name");
        let species = text_column(&df, "species");
        let types = text_column(&df, "type");
        let watered = text_column(&df, "last_watered");
        let fertilized = text_column(&df, "last_fertilized");
        let sunlight = text_column(&df, "sunlight_hours");
        let temps = text_column(&df, "temp_c");
        let humidity = text_column(&df, "humidity_percent");
        let notes = text_column(&df, "notes");
        let images = text_column(&df, "image_path");
        let added = text_column(&df, "added_on");

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let id = parse_id(cell(ids, row), PLANTS_TABLE, row)?;

            let added_on = cell(added, row).and_then(parse_event_date).unwrap_or_else(|| {
                tracing::warn!(
                    "Plant {} (row {}) has no readable added_on date, listing it as oldest",
                    id,
                    row
                );
                NaiveDate::default()
            });

            records.push(PlantRecord {
                id,
                name: cell(names, row).unwrap_or_default().to_string(),
                species: cell(species, row).unwrap_or_default().to_string(),
                plant_type: cell(types, row).unwrap_or("Unknown").to_string(),
                last_watered: cell(watered, row).and_then(parse_event_date),
                last_fertilized: cell(fertilized, row).and_then(parse_event_date),
                sunlight_hours: parse_number(cell(sunlight, row), PLANTS_TABLE, row)?,
                temp_c: parse_number(cell(temps, row), PLANTS_TABLE, row)?,
                humidity_percent: parse_number(cell(humidity, row), PLANTS_TABLE, row)?,
                notes: cell(notes, row).unwrap_or_default().to_string(),
                image_path: cell(images, row).map(str::to_string),
                added_on,
            });
        }

        Ok(records)
    }

    fn write_plants(&self, records: &[PlantRecord]) -> Result<(), StoreError> {
        let mut df = df!(
            "id" => records.iter().map(|r| r.id).collect::<Vec<_>>(),
            "name" => records.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "species" => records.iter().map(|r| r.species.clone()).collect::<Vec<_>>(),
            "type" => records.iter().map(|r| r.plant_type.clone()).collect::<Vec<_>>(),
            "last_watered" => records.iter().map(|r| r.last_watered.map(format_date)).collect::<Vec<_>>(),
            "last_fertilized" => records.iter().map(|r| r.last_fertilized.map(format_date)).collect::<Vec<_>>(),
            "sunlight_hours" => records.iter().map(|r| r.sunlight_hours).collect::<Vec<_>>(),
            "temp_c" => records.iter().map(|r| r.temp_c).collect::<Vec<_>>(),
            "humidity_percent" => records.iter().map(|r| r.humidity_percent).collect::<Vec<_>>(),
            "notes" => records.iter().map(|r| r.notes.clone()).collect::<Vec<_>>(),
            "image_path" => records.iter().map(|r| r.image_path.clone()).collect::<Vec<_>>(),
            "added_on" => records.iter().map(|r| format_date(r.added_on)).collect::<Vec<_>>(),
        )?;

        write_table(&self.plants_path(), &mut df)?;
        tracing::debug!("Wrote {} plants to {}", records.len(), self.plants_path().display());
        Ok(())
    }

    fn read_growth(&self) -> Result<Vec<GrowthEntry>, StoreError> {
        let Some(df) = read_table(&self.growth_path())? else {
            return Ok(Vec::new());
        };

        let plant_ids = text_column(&df, "plant_id");
        let dates = text_column(&df, "date");
        let heights = text_column(&df, "height_cm");
        let notes = text_column(&df, "notes");

        let mut entries = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let plant_id = parse_id(cell(plant_ids, row), GROWTH_TABLE, row)?;
            let Some(date) = cell(dates, row).and_then(parse_event_date) else {
                return Err(StoreError::Corrupt {
                    table: GROWTH_TABLE,
                    row,
                    reason: "missing or unreadable date".to_string(),
                });
            };

            entries.push(GrowthEntry {
                plant_id,
                date,
                height_cm: parse_number(cell(heights, row), GROWTH_TABLE, row)?,
                notes: cell(notes, row).unwrap_or_default().to_string(),
            });
        }

        Ok(entries)
    }

    fn write_growth(&self, entries: &[GrowthEntry]) -> Result<(), StoreError> {
        let mut df = df!(
            "plant_id" => entries.iter().map(|e| e.plant_id).collect::<Vec<_>>(),
            "date" => entries.iter().map(|e| format_date(e.date)).collect::<Vec<_>>(),
            "height_cm" => entries.iter().map(|e| e.height_cm).collect::<Vec<_>>(),
            "notes" => entries.iter().map(|e| e.notes.clone()).collect::<Vec<_>>(),
        )?;

        write_table(&self.growth_path(), &mut df)
    }
}

impl PlantRepository for CsvStore {
    fn load(&self) -> Result<Vec<PlantRecord>, StoreError> {
        self.read_plants()
    }

    fn save(&self, record: PlantRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_plants()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_plants(&records)
    }

    fn insert(&self, plant: NewPlant, today: NaiveDate) -> Result<PlantRecord, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_plants()?;
        let record = plant.into_record(next_id(records.iter().map(|r| r.id))?, today)?;
        records.push(record.clone());
        self.write_plants(&records)?;
        tracing::info!("Saved plant '{}' (id {})", record.name, record.id);
        Ok(record)
    }

    fn update(
        &self,
        id: i64,
        change: &mut dyn FnMut(&mut PlantRecord),
    ) -> Result<PlantRecord, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_plants()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        change(record);
        let updated = record.clone();
        self.write_plants(&records)?;
        Ok(updated)
    }
}

impl GrowthLog for CsvStore {
    fn append(&self, entry: GrowthEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = self.read_growth()?;
        tracing::info!("Growth logged for plant {}: {} cm", entry.plant_id, entry.height_cm);
        entries.push(entry);
        self.write_growth(&entries)
    }

    fn for_plant(&self, plant_id: i64) -> Result<Vec<GrowthEntry>, StoreError> {
        let mut entries: Vec<GrowthEntry> = self
            .read_growth()?
            .into_iter()
            .filter(|e| e.plant_id == plant_id)
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }
}

// ============================================================================
// Table helpers
// ============================================================================

/// `None` when the file is absent or empty
fn read_table(path: &Path) -> Result<Option<DataFrame>, StoreError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if meta.len() == 0 {
        return Ok(None);
    }

    // Schema length 0: every column is read as text
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(Some(df))
}

fn write_table(path: &Path, df: &mut DataFrame) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("csv.tmp");
    let io_err = |source: std::io::Error| StoreError::Io {
        path: tmp_path.clone(),
        source,
    };

    let mut file = File::create(&tmp_path).map_err(io_err)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|c| c.str().ok())
}

/// Trimmed cell text; blank cells and nulls are `None`
fn cell(column: Option<&StringChunked>, row: usize) -> Option<&str> {
    column
        .and_then(|c| c.get(row))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_id(raw: Option<&str>, table: &'static str, row: usize) -> Result<i64, StoreError> {
    let raw = raw.ok_or_else(|| StoreError::Corrupt {
        table,
        row,
        reason: "missing id".to_string(),
    })?;
    raw.parse::<i64>().map_err(|_| StoreError::Corrupt {
        table,
        row,
        reason: format!("id {:?} is not an integer", raw),
    })
}

/// Blank cells read as 0
fn parse_number(raw: Option<&str>, table: &'static str, row: usize) -> Result<f64, StoreError> {
    match raw {
        None => Ok(0.0),
        Some(text) => text.parse::<f64>().map_err(|_| StoreError::Corrupt {
            table,
            row,
            reason: format!("{:?} is not a number", text),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn new_plant(name: &str, species: &str) -> NewPlant {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "species": species,
            "last_watered": "2024-06-01",
            "sunlight_hours": 7.5,
            "notes": "south window, \"sunny\""
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_files_read_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        assert!(store.load().unwrap().is_empty());
        assert!(store.for_plant(1).unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        let saved = store.insert(new_plant("Balcony Tomato", "Tomato"), day(3)).unwrap();
        store.insert(new_plant("Kitchen Basil", "Basil"), day(4)).unwrap();

        // Fresh handle over the same directory
        let reopened = CsvStore::open(dir.path()).unwrap();
        let records = reopened.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], saved);
        assert_eq!(records[0].last_watered, Some(day(1)));
        assert_eq!(records[0].last_fertilized, None);
        assert_relative_eq!(records[0].sunlight_hours, 7.5);
        assert_eq!(records[0].notes, "south window, \"sunny\"");
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn test_save_replaces_by_id() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        let plant = store.insert(new_plant("A", "Rose"), day(1)).unwrap();

        store.mark_watered(plant.id, day(9)).unwrap();
        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].last_watered, Some(day(9)));
    }

    #[test]
    fn test_legacy_rows_with_blanks() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PLANTS_FILE),
            "id,name,species,type,last_watered,last_fertilized,sunlight_hours,temp_c,humidity_percent,notes,image_path,added_on\n\
             1717000000,Fig,Ficus,Fruit,not a date,,,,,,,2024-06-02\n",
        )
        .unwrap();

        let store = CsvStore::open(dir.path()).unwrap();
        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        let fig = &records[0];
        assert_eq!(fig.id, 1717000000);
        assert_eq!(fig.last_watered, None);
        assert_eq!(fig.last_fertilized, None);
        assert_eq!(fig.sunlight_hours, 0.0);
        assert_eq!(fig.image_path, None);
        assert_eq!(fig.added_on, day(2));

        // Next id continues after the largest existing one
        let next = store.insert(new_plant("B", "Basil"), day(5)).unwrap();
        assert_eq!(next.id, 1717000001);
    }

    #[test]
    fn test_unreadable_added_on_lists_last() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PLANTS_FILE),
            "id,name,species,added_on\n1,Fig,Ficus,someday\n2,Rose,Rose,2024-06-02\n",
        )
        .unwrap();

        let store = CsvStore::open(dir.path()).unwrap();
        let records = store.list_all().unwrap();
        assert_eq!(records[0].id, 2);
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].added_on, NaiveDate::default());
    }

    #[test]
    fn test_insert_after_max_id_is_corrupt() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PLANTS_FILE),
            format!("id,name,species,added_on\n{},Fig,Ficus,2024-06-02\n", i64::MAX),
        )
        .unwrap();

        let store = CsvStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.insert(new_plant("B", "Basil"), day(5)),
            Err(StoreError::Corrupt { table: "plants", row: 0, .. })
        ));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_parallel_marks_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        let plant = store.insert(new_plant("A", "Rose"), day(1)).unwrap();

        for round in 0..20 {
            store
                .update(plant.id, &mut |r| {
                    r.last_watered = None;
                    r.last_fertilized = None;
                })
                .unwrap();
            let barrier = std::sync::Barrier::new(2);

            std::thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    store.mark_watered(plant.id, day(9)).unwrap();
                });
                s.spawn(|| {
                    barrier.wait();
                    store.mark_fertilized(plant.id, day(10)).unwrap();
                });
            });

            let stored = store.get(plant.id).unwrap();
            assert_eq!(stored.last_watered, Some(day(9)), "round {}", round);
            assert_eq!(stored.last_fertilized, Some(day(10)), "round {}", round);
        }
    }

    #[test]
    fn test_update_unknown_id() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.mark_fertilized(7, day(1)),
            Err(StoreError::NotFound(7))
        ));
    }

    #[test]
    fn test_corrupt_id_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PLANTS_FILE), "id,name,species\nabc,Fig,Ficus\n").unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load(),
            Err(StoreError::Corrupt { table: "plants", row: 0, .. })
        ));
    }

    #[test]
    fn test_growth_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        store.append(GrowthEntry::new(1, day(8), 14.2, "new leaf").unwrap()).unwrap();
        store.append(GrowthEntry::new(1, day(1), 10.0, "").unwrap()).unwrap();
        store.append(GrowthEntry::new(2, day(2), 3.0, "").unwrap()).unwrap();

        let entries = store.for_plant(1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, day(1));
        assert_relative_eq!(entries[1].height_cm, 14.2);
        assert_eq!(entries[1].notes, "new leaf");
    }
}
