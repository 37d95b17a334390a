//! Integration tests for on-disk persistence

use cardiotrack::export;
use cardiotrack::store::{
    BlobStore, FileBlobStore, RecordStore, Settings, SettingsStore, RECORDS_KEY, SETTINGS_KEY,
};
use cardiotrack::{Observation, Tracker};

fn reading(systolic: u32, diastolic: u32, timestamp: i64) -> Observation {
    Observation::new(systolic, diastolic, 70, timestamp, None)
}

#[test]
fn test_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = reading(121, 79, 1_000);
    let second = reading(140, 92, 500);
    {
        let store = RecordStore::new(FileBlobStore::new(dir.path()));
        store.add(first.clone()).unwrap();
        store.add(second.clone()).unwrap();
    }

    let reopened = RecordStore::new(FileBlobStore::new(dir.path()));
    assert_eq!(reopened.list(), vec![second, first]);
}

#[test]
fn test_missing_directory_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(FileBlobStore::new(dir.path().join("not-created-yet")));

    assert!(store.list().is_empty());
    store.add(reading(120, 80, 1)).unwrap();
    assert_eq!(store.list().len(), 1);
}

#[test]
fn test_corrupt_file_recovers_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    std::fs::write(blobs.path_for(RECORDS_KEY), "[{\"id\": truncated").unwrap();

    let store = RecordStore::new(blobs.clone());
    assert!(store.list().is_empty());

    let list = store.add(reading(118, 75, 1)).unwrap();
    assert_eq!(list.len(), 1);

    let on_disk = std::fs::read_to_string(blobs.path_for(RECORDS_KEY)).unwrap();
    let decoded: Vec<Observation> = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(decoded, list);
}

#[test]
fn test_write_leaves_no_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    blobs.write(SETTINGS_KEY, "{}").unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![format!("{SETTINGS_KEY}.json")]);
}

#[test]
fn test_settings_merge_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(FileBlobStore::new(dir.path()));

    store
        .save(Settings {
            google_sheet_url: Some("https://script.test/exec".to_string()),
            last_sync_time: None,
        })
        .unwrap();
    store
        .save(Settings {
            google_sheet_url: None,
            last_sync_time: Some(1_717_000_000_000),
        })
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{SETTINGS_KEY}.json"))).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["googleSheetUrl"], "https://script.test/exec");
    assert_eq!(json["lastSyncTime"], 1_717_000_000_000i64);
}

#[test]
fn test_records_and_settings_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    std::fs::write(blobs.path_for(SETTINGS_KEY), "garbage").unwrap();

    let mut tracker = Tracker::open(blobs.clone());
    assert_eq!(tracker.settings(), &Settings::default());

    tracker.add_reading(reading(130, 85, 1)).unwrap();
    let reopened = Tracker::open(blobs);
    assert_eq!(reopened.records().len(), 1);
}

#[test]
fn test_json_export_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(FileBlobStore::new(dir.path()));
    store.add(reading(125, 95, 10)).unwrap();
    let mut noted = reading(119, 79, 20);
    noted.note = Some("cuff on left arm, seated".to_string());
    let records = store.add(noted).unwrap();

    let path = dir.path().join("export.json");
    std::fs::write(&path, export::to_json(&records).unwrap()).unwrap();

    let decoded = export::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(decoded, records);
}
