use std::sync::Once;

use pretty_assertions::assert_eq;
use watch_core::{
    compute_differences, detect_differences, BlobStore, MemoryBlobStore, MuteRegistry, Record,
    StoreError, MUTE_KEY,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(watch_logging::initialize_for_tests);
}

fn gpu(price: f64) -> Record {
    Record::new("GPU-A", "1", price)
}

fn cpu(price: f64) -> Record {
    Record::new("CPU-B", "2", price)
}

#[test]
fn reports_new_items_and_price_drops_in_observed_order() {
    init_logging();
    let store = MemoryBlobStore::new();
    let muted = MuteRegistry::load(&store).unwrap();
    let baseline = vec![gpu(300.0)];
    let observed = vec![gpu(250.0), cpu(150.0)];

    let differences = compute_differences(&baseline, &observed, &muted);

    let mut expected_drop = gpu(250.0);
    expected_drop.old_price = Some(300.0);
    assert_eq!(differences, vec![expected_drop, cpu(150.0)]);
    assert!(differences[0].is_price_drop());
    assert!(!differences[1].is_price_drop());
}

#[test]
fn equal_or_higher_prices_are_not_differences() {
    init_logging();
    let store = MemoryBlobStore::new();
    let muted = MuteRegistry::load(&store).unwrap();
    let baseline = vec![gpu(300.0), cpu(150.0)];
    let observed = vec![gpu(300.0), cpu(175.5)];

    assert!(compute_differences(&baseline, &observed, &muted).is_empty());
}

#[test]
fn muted_ids_are_skipped_whatever_their_status() {
    init_logging();
    let store = MemoryBlobStore::new().with_blob(MUTE_KEY, r#"["2", 1]"#);
    let muted = MuteRegistry::load(&store).unwrap();
    let baseline = vec![gpu(300.0)];
    let observed = vec![gpu(10.0), cpu(150.0), Record::new("SSD-C", "3", 80.0)];

    let differences = compute_differences(&baseline, &observed, &muted);

    assert_eq!(differences, vec![Record::new("SSD-C", "3", 80.0)]);
}

#[test]
fn matching_uses_name_and_first_baseline_match() {
    init_logging();
    let store = MemoryBlobStore::new();
    let muted = MuteRegistry::load(&store).unwrap();
    // Same name twice in the baseline: only the first entry is compared.
    let baseline = vec![Record::new("GPU-A", "9", 200.0), Record::new("GPU-A", "1", 500.0)];
    // Different id but same name still matches by name.
    let observed = vec![Record::new("GPU-A", "77", 250.0)];

    assert!(compute_differences(&baseline, &observed, &muted).is_empty());
}

#[test]
fn empty_baseline_makes_every_item_new() {
    init_logging();
    let store = MemoryBlobStore::new();
    let muted = MuteRegistry::load(&store).unwrap();
    let observed = vec![gpu(250.0), cpu(150.0)];

    let differences = compute_differences(&[], &observed, &muted);

    assert_eq!(differences, observed);
    assert!(differences.iter().all(|d| d.old_price.is_none()));
}

#[test]
fn observed_records_are_not_mutated() {
    init_logging();
    let store = MemoryBlobStore::new();
    let muted = MuteRegistry::load(&store).unwrap();
    let observed = vec![gpu(100.0)];

    let _ = compute_differences(&[gpu(300.0)], &observed, &muted);

    assert_eq!(observed[0].old_price, None);
}

struct BrokenStore;

impl BlobStore for BrokenStore {
    fn load(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::storage(key, "connection refused"))
    }

    fn save(&self, key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::storage(key, "connection refused"))
    }
}

#[test]
fn detection_fails_when_mute_registry_is_unavailable() {
    init_logging();
    let err = detect_differences(&BrokenStore, &[], &[cpu(150.0)]).unwrap_err();
    assert_eq!(err, StoreError::storage(MUTE_KEY, "connection refused"));
}

#[test]
fn detection_fails_when_mute_registry_is_corrupt() {
    init_logging();
    let store = MemoryBlobStore::new().with_blob(MUTE_KEY, "not json");
    let err = detect_differences(&store, &[], &[cpu(150.0)]).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == MUTE_KEY));
}

#[test]
fn detection_with_missing_registry_mutes_nothing() {
    init_logging();
    let store = MemoryBlobStore::new();
    let differences = detect_differences(&store, &[], &[cpu(150.0)]).unwrap();
    assert_eq!(differences, vec![cpu(150.0)]);
}
