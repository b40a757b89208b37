use std::fs;

use tempfile::TempDir;
use watch_core::{load_baseline, save_baseline, BlobStore, Record, StoreError, BASELINE_KEY};
use watch_engine::{ensure_dir, AtomicFileWriter, FsBlobStore, PersistError};

#[test]
fn data_dir_is_created_with_parents() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("var").join("clearance-watch");

    ensure_dir(&data_dir).unwrap();
    ensure_dir(&data_dir).unwrap();

    assert!(data_dir.is_dir());
}

#[test]
fn rewriting_a_blob_replaces_it_whole() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let snooze = writer.write("snooze.json", br#"["1"]"#).unwrap();

    writer.write("snooze.json", br#"["1","2"]"#).unwrap();

    assert_eq!(fs::read_to_string(&snooze).unwrap(), r#"["1","2"]"#);
    let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1, "temp files left behind");
}

#[test]
fn data_dir_occupied_by_a_file_is_refused() {
    let temp = TempDir::new().unwrap();
    let occupied = temp.path().join("watch-data");
    fs::write(&occupied, "not a directory").unwrap();

    let result = AtomicFileWriter::new(occupied.clone()).write("data.json", b"[]");

    assert!(matches!(result, Err(PersistError::Dir(_))));
    assert_eq!(fs::read_to_string(&occupied).unwrap(), "not a directory");
}

#[test]
fn writer_refuses_path_like_names() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    for name in ["../escape.json", "a/b.json", "..", ""] {
        assert!(
            matches!(writer.write(name, b"x"), Err(PersistError::FileName(_))),
            "accepted {name:?}"
        );
    }
}

#[test]
fn fs_store_reports_missing_keys_as_not_found() {
    let temp = TempDir::new().unwrap();
    let store = FsBlobStore::new(temp.path().join("never-created"));

    assert_eq!(
        store.load("snooze.json"),
        Err(StoreError::NotFound("snooze.json".to_string()))
    );
    assert!(store.load("data.json").unwrap_err().is_not_found());
    assert!(!store.load("../data.json").unwrap_err().is_not_found());
}

#[test]
fn fs_store_round_trips_the_baseline() {
    let temp = TempDir::new().unwrap();
    let store = FsBlobStore::new(temp.path().join("state"));
    let snapshot = vec![Record {
        change_timestamp: Some(1_736_400_888_852),
        ..Record::new("GPU-A", "1", 250.0).with_original_price(300.0)
    }];

    save_baseline(&store, &snapshot).unwrap();

    assert!(temp.path().join("state").join(BASELINE_KEY).is_file());
    assert_eq!(load_baseline(&store).unwrap(), snapshot);
}

#[test]
fn fs_store_rejects_keys_outside_its_dir() {
    let temp = TempDir::new().unwrap();
    let store = FsBlobStore::new(temp.path().to_path_buf());

    assert!(matches!(store.load("../data.json"), Err(StoreError::Storage { .. })));
    assert!(matches!(store.save("../data.json", b"[]"), Err(StoreError::Storage { .. })));
}
