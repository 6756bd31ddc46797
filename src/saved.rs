use crate::import::Record;
use crate::storage::StorageManager;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

pub const SAVED_FILE: &str = "saved_profiles.json";

/// A bookmarked record: its id, when it was saved, and a snapshot of the
/// record at save time. The snapshot is a copy; later changes to the source
/// table do not propagate into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProfile {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub profile: Record,
}

/// The persisted set of saved profiles, kept in insertion order. Every
/// mutation rewrites the whole file; a missing or unparsable file loads as
/// an empty list.
pub struct SavedStore {
    path: PathBuf,
    entries: Vec<SavedProfile>,
}

impl SavedStore {
    /// Load the store from the app data directory.
    pub fn load(storage: &StorageManager) -> Self {
        let path = storage.data_file(SAVED_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Self { path, entries }
    }

    /// Save the record if it is not saved, remove it if it is. Returns the
    /// new membership state.
    pub fn toggle_save(&mut self, record: &Record) -> Result<bool> {
        let saved = if self.is_saved(&record.id) {
            self.entries.retain(|e| e.id != record.id);
            false
        } else {
            self.entries.push(SavedProfile {
                id: record.id.clone(),
                saved_at: Utc::now(),
                profile: record.clone(),
            });
            true
        };
        self.persist()?;
        Ok(saved)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Unconditional delete; a no-op for an absent id.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() != before {
            self.persist()?;
        }
        Ok(())
    }

    /// Saved entries in insertion order.
    pub fn list(&self) -> &[SavedProfile] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SavedProfile> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        // Advisory only; concurrent writers from other processes still race.
        if let Err(e) = fs2::FileExt::try_lock_exclusive(&file) {
            eprintln!("Warning: Could not lock saved-profiles file: {}", e);
        }

        file.write_all(serde_json::to_string_pretty(&self.entries)?.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::LeadTable;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SavedStore, Vec<Record>) {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        let store = SavedStore::load(&storage);
        let records = LeadTable::from_rows(
            vec!["Name".into()],
            vec![vec!["Anna".into()], vec!["Bob".into()], vec!["Carl".into()]],
        )
        .unwrap()
        .records;
        (dir, store, records)
    }

    #[test]
    fn test_toggle_save_inserts_then_removes() {
        let (_dir, mut store, records) = fixture();
        assert!(store.toggle_save(&records[2]).unwrap());
        assert!(store.is_saved("3"));
        assert!(!store.toggle_save(&records[2]).unwrap());
        assert!(!store.is_saved("3"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_saved_entry_is_a_snapshot() {
        let (_dir, mut store, mut records) = fixture();
        store.toggle_save(&records[0]).unwrap();
        records[0].fields.insert("name".to_string(), "Renamed".to_string());
        assert_eq!(store.get("1").unwrap().profile.get("name"), "Anna");
    }

    #[test]
    fn test_remove_is_a_noop_for_absent_id() {
        let (_dir, mut store, records) = fixture();
        store.toggle_save(&records[0]).unwrap();
        store.remove("99").unwrap();
        assert_eq!(store.list().len(), 1);
        store.remove("1").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let (_dir, mut store, records) = fixture();
        store.toggle_save(&records[1]).unwrap();
        store.toggle_save(&records[0]).unwrap();
        let ids: Vec<&str> = store.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_mutations_survive_a_reload() {
        let (dir, mut store, records) = fixture();
        store.toggle_save(&records[0]).unwrap();
        store.toggle_save(&records[1]).unwrap();

        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        let reloaded = SavedStore::load(&storage);
        assert_eq!(reloaded.list().len(), 2);
        assert!(reloaded.is_saved("1"));
        assert_eq!(reloaded.get("2").unwrap().profile.get("name"), "Bob");
    }

    #[test]
    fn test_corrupt_blob_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        storage.ensure_data_dir().unwrap();
        std::fs::write(storage.data_file(SAVED_FILE), "{ not json").unwrap();

        let store = SavedStore::load(&storage);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_missing_blob_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        let store = SavedStore::load(&storage);
        assert!(store.list().is_empty());
    }
}
