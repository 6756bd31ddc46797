use leadtui::saved::{SavedStore, SAVED_FILE};
use leadtui::{LeadTable, Record, StorageManager};
use tempfile::TempDir;

fn setup() -> (TempDir, StorageManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = StorageManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, storage)
}

fn records() -> Vec<Record> {
    LeadTable::from_rows(
        vec!["Name".to_string(), "Company Name".to_string()],
        vec![
            vec!["Anna".to_string(), "Acme".to_string()],
            vec!["Bob".to_string(), "Beta".to_string()],
            vec!["Carl".to_string(), "Gamma".to_string()],
        ],
    )
    .unwrap()
    .records
}

#[test]
fn test_toggle_is_an_involution() {
    let (_dir, storage) = setup();
    let mut store = SavedStore::load(&storage);
    let records = records();

    let before: Vec<String> = store.list().iter().map(|e| e.id.clone()).collect();
    assert!(store.toggle_save(&records[2]).unwrap());
    assert!(!store.toggle_save(&records[2]).unwrap());
    let after: Vec<String> = store.list().iter().map(|e| e.id.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_save_id_three_then_toggle_removes_it() {
    let (_dir, storage) = setup();
    let mut store = SavedStore::load(&storage);
    let records = records();

    store.toggle_save(&records[2]).unwrap();
    assert!(store.list().iter().any(|e| e.id == "3"));

    store.toggle_save(&records[2]).unwrap();
    assert!(!store.list().iter().any(|e| e.id == "3"));
}

#[test]
fn test_every_mutation_rewrites_the_blob() {
    let (_dir, storage) = setup();
    let mut store = SavedStore::load(&storage);
    let records = records();

    store.toggle_save(&records[0]).unwrap();
    let first = std::fs::read_to_string(storage.data_file(SAVED_FILE)).unwrap();
    assert!(first.contains("Anna"));

    store.toggle_save(&records[1]).unwrap();
    let second = std::fs::read_to_string(storage.data_file(SAVED_FILE)).unwrap();
    assert!(second.contains("Bob"));

    store.remove("1").unwrap();
    let third = std::fs::read_to_string(storage.data_file(SAVED_FILE)).unwrap();
    assert!(!third.contains("Anna"));
    assert!(third.contains("Bob"));
}

#[test]
fn test_corrupt_blob_degrades_to_empty_without_error() {
    let (_dir, storage) = setup();
    storage.ensure_data_dir().unwrap();
    std::fs::write(storage.data_file(SAVED_FILE), "\u{0}garbage\u{0}").unwrap();

    let store = SavedStore::load(&storage);
    assert!(store.list().is_empty());
}

#[test]
fn test_empty_blob_degrades_to_empty() {
    let (_dir, storage) = setup();
    storage.ensure_data_dir().unwrap();
    std::fs::write(storage.data_file(SAVED_FILE), "").unwrap();

    let store = SavedStore::load(&storage);
    assert!(store.list().is_empty());
}

#[test]
fn test_reload_after_corruption_can_save_again() {
    let (_dir, storage) = setup();
    storage.ensure_data_dir().unwrap();
    std::fs::write(storage.data_file(SAVED_FILE), "not json at all").unwrap();

    let mut store = SavedStore::load(&storage);
    let records = records();
    assert!(store.toggle_save(&records[0]).unwrap());

    let reloaded = SavedStore::load(&storage);
    assert_eq!(reloaded.list().len(), 1);
    assert_eq!(reloaded.get("1").unwrap().profile.get("name"), "Anna");
}

#[test]
fn test_snapshot_does_not_track_source_edits() {
    let (_dir, storage) = setup();
    let mut store = SavedStore::load(&storage);
    let mut records = records();

    store.toggle_save(&records[1]).unwrap();
    records[1]
        .fields
        .insert("companyname".to_string(), "Changed Inc".to_string());

    assert_eq!(store.get("2").unwrap().profile.get("companyname"), "Beta");
}
