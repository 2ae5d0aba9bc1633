//! In-memory store
//!
//! Holds plants and growth entries behind `RwLock`s. Nothing survives the
//! process; used by tests and by the server when no data directory is set.

use std::sync::RwLock;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use super::{next_id, GrowthEntry, GrowthLog, NewPlant, PlantRecord, PlantRepository, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    plants: RwLock<FxHashMap<i64, PlantRecord>>,
    growth: RwLock<Vec<GrowthEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing records
    pub fn with_plants(records: impl IntoIterator<Item = PlantRecord>) -> Self {
        let plants = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            plants: RwLock::new(plants),
            growth: RwLock::new(Vec::new()),
        }
    }
}

impl PlantRepository for InMemoryStore {
    /// Ordered by id so repeated loads agree
    fn load(&self) -> Result<Vec<PlantRecord>, StoreError> {
        let plants = self.plants.read().map_err(|_| StoreError::Poisoned)?;
        let mut records: Vec<PlantRecord> = plants.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn save(&self, record: PlantRecord) -> Result<(), StoreError> {
        let mut plants = self.plants.write().map_err(|_| StoreError::Poisoned)?;
        plants.insert(record.id, record);
        Ok(())
    }

    fn insert(&self, plant: NewPlant, today: NaiveDate) -> Result<PlantRecord, StoreError> {
        let mut plants = self.plants.write().map_err(|_| StoreError::Poisoned)?;
        let record = plant.into_record(next_id(plants.keys().copied())?, today)?;
        plants.insert(record.id, record.clone());
        tracing::info!("Saved plant '{}' (id {})", record.name, record.id);
        Ok(record)
    }

    /// Holds the write guard across the whole change
    fn update(
        &self,
        id: i64,
        change: &mut dyn FnMut(&mut PlantRecord),
    ) -> Result<PlantRecord, StoreError> {
        let mut plants = self.plants.write().map_err(|_| StoreError::Poisoned)?;
        let record = plants.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        change(record);
        Ok(record.clone())
    }

    fn get(&self, id: i64) -> Result<PlantRecord, StoreError> {
        let plants = self.plants.read().map_err(|_| StoreError::Poisoned)?;
        plants.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }
}

impl GrowthLog for InMemoryStore {
    fn append(&self, entry: GrowthEntry) -> Result<(), StoreError> {
        let mut growth = self.growth.write().map_err(|_| StoreError::Poisoned)?;
        growth.push(entry);
        Ok(())
    }

    fn for_plant(&self, plant_id: i64) -> Result<Vec<GrowthEntry>, StoreError> {
        let growth = self.growth.read().map_err(|_| StoreError::Poisoned)?;
        let mut entries: Vec<GrowthEntry> = growth
            .iter()
            .filter(|e| e.plant_id == plant_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn new_plant(name: &str, species: &str) -> NewPlant {
        serde_json::from_value(serde_json::json!({ "name": name, "species": species })).unwrap()
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let a = store.insert(new_plant("A", "Tomato"), day(1)).unwrap();
        let b = store.insert(new_plant("B", "Rose"), day(2)).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.insert(new_plant("", "Tomato"), day(1)),
            Err(StoreError::Validation(_))
        ));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_list_all_newest_first() {
        let store = InMemoryStore::new();
        store.insert(new_plant("Old", "Tomato"), day(1)).unwrap();
        store.insert(new_plant("New", "Basil"), day(9)).unwrap();
        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[test]
    fn test_mark_watered_and_fertilized() {
        let store = InMemoryStore::new();
        let plant = store.insert(new_plant("A", "Tomato"), day(1)).unwrap();

        let updated = store.mark_watered(plant.id, day(5)).unwrap();
        assert_eq!(updated.last_watered, Some(day(5)));
        assert_eq!(store.get(plant.id).unwrap().last_watered, Some(day(5)));

        store.mark_fertilized(plant.id, day(6)).unwrap();
        assert_eq!(store.get(plant.id).unwrap().last_fertilized, Some(day(6)));

        assert!(matches!(store.mark_watered(99, day(5)), Err(StoreError::NotFound(99))));
    }

    #[test]
    fn test_concurrent_marks_both_land() {
        let store = InMemoryStore::new();
        let plant = store.insert(new_plant("A", "Tomato"), day(1)).unwrap();
        let barrier = std::sync::Barrier::new(2);

        std::thread::scope(|s| {
            s.spawn(|| {
                barrier.wait();
                store.mark_watered(plant.id, day(5)).unwrap();
            });
            s.spawn(|| {
                barrier.wait();
                store.mark_fertilized(plant.id, day(6)).unwrap();
            });
        });

        let stored = store.get(plant.id).unwrap();
        assert_eq!(stored.last_watered, Some(day(5)));
        assert_eq!(stored.last_fertilized, Some(day(6)));
    }

    #[test]
    fn test_growth_entries_sorted_by_date() {
        let store = InMemoryStore::new();
        store.append(GrowthEntry::new(1, day(10), 12.5, "").unwrap()).unwrap();
        store.append(GrowthEntry::new(2, day(3), 4.0, "other plant").unwrap()).unwrap();
        store.append(GrowthEntry::new(1, day(2), 8.0, "first").unwrap()).unwrap();

        let entries = store.for_plant(1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, day(2));
        assert_relative_eq!(entries[1].height_cm, 12.5);
        assert!(store.for_plant(3).unwrap().is_empty());
    }
}
