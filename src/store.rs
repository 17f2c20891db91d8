use crate::game::DayRecord;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed key addressing the whole persisted status blob. The value survives
/// from the first release, so changing it orphans every player's history.
pub const STATUS_KEY: &str = "bibleversequest_status_v1";

///
/// The persistence boundary: an addressable string store. The engine never
/// sees I/O errors through this trait; a failed read is an absent value and a
/// failed write is the backend's problem to report.
///
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory backend. Used by tests, and by the driver when no data
/// directory can be resolved.
#[derive(Default, Debug)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// File backend: one JSON document per key under a base directory. Writes go
/// through a temp file and a rename so a crash mid-write cannot leave a torn
/// blob for the next load to choke on.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = write_atomic(&self.dir, &self.path_for(key), value) {
            log::warn!("failed to persist {}: {}", key, err);
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, value: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

///
/// The mapping of day-key → DayRecord behind a single store key. Loaded once
/// at startup, mutated through `ensure_day`, and written back in full on
/// every save so no partial state is ever observable on the next load.
///
/// Records for past days stay in the mapping untouched; only today's entry is
/// ever mutated.
///
pub struct StatusStore<S> {
    backend: S,
    days: HashMap<String, DayRecord>,
}

impl<S: KeyValueStore> StatusStore<S> {
    /// Loads the persisted mapping. Missing or corrupt data yields an empty
    /// mapping; a deserialization failure is recovery, not an error.
    pub fn load(backend: S) -> Self {
        let days = backend
            .get(STATUS_KEY)
            .and_then(|raw| {
                match serde_json::from_str::<HashMap<String, DayRecord>>(&raw) {
                    Ok(days) => Some(days),
                    Err(err) => {
                        log::warn!("discarding unreadable status blob: {}", err);
                        None
                    }
                }
            })
            .unwrap_or_default();

        log::debug!("loaded {} day records from store", days.len());
        Self { backend, days }
    }

    /// Serializes and writes the full mapping as one value.
    pub fn save(&mut self) {
        match serde_json::to_string(&self.days) {
            Ok(raw) => self.backend.set(STATUS_KEY, &raw),
            Err(err) => log::warn!("failed to serialize status blob: {}", err),
        }
    }

    /// Returns the record for the given day, inserting a freshly defaulted one
    /// when the day is first seen. Every access runs the idempotent migration
    /// so fields added after a blob was written pick up their zero-values.
    pub fn ensure_day(&mut self, day_key: &str) -> &mut DayRecord {
        let rec = self
            .days
            .entry(day_key.to_string())
            .or_insert_with(DayRecord::default);
        rec.migrate();
        rec
    }

    pub fn day(&self, day_key: &str) -> Option<&DayRecord> {
        self.days.get(day_key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MAX_PLAYS;

    #[test]
    fn test_missing_blob_loads_empty() {
        let store = StatusStore::load(MemoryStore::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let mut backend = MemoryStore::default();
        backend.set(STATUS_KEY, "{not json!!");
        let store = StatusStore::load(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_ensure_day_inserts_once() {
        let mut store = StatusStore::load(MemoryStore::default());
        store.ensure_day("2025-06-01").message = "hello".to_string();
        let again = store.ensure_day("2025-06-01");
        assert_eq!(again.message, "hello", "second ensure must not reset the record");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = StatusStore::load(MemoryStore::default());
        {
            let day = store.ensure_day("2025-06-01");
            day.play_count = 2;
            day.finished = true;
            day.message = "Solved!".to_string();
        }
        store.save();

        let reloaded = StatusStore::load(store.backend);
        let day = reloaded.day("2025-06-01").expect("day should survive");
        assert_eq!(day.play_count, 2);
        assert!(day.finished);
        assert_eq!(day.message, "Solved!");
    }

    #[test]
    fn test_loaded_records_are_migrated_on_access() {
        let mut backend = MemoryStore::default();
        backend.set(
            STATUS_KEY,
            r#"{"2025-06-01":{"finished":false,"rows":[],"msg":"","reveals":[],"playCount":99}}"#,
        );
        let mut store = StatusStore::load(backend);
        let day = store.ensure_day("2025-06-01");
        assert_eq!(day.play_count, MAX_PLAYS);
    }
}
