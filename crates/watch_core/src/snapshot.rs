use serde::de::DeserializeOwned;
use serde::Serialize;
use watch_logging::watch_debug;

use crate::{BlobStore, Record, Snapshot, StoreError};

/// Key under which the baseline snapshot is persisted.
pub const BASELINE_KEY: &str = "data.json";

/// Loads the persisted baseline.
///
/// A missing baseline is a first run and yields an empty snapshot, which makes
/// every observed item a new-item difference. Any other failure propagates.
pub fn load_baseline(store: &dyn BlobStore) -> Result<Snapshot, StoreError> {
    match load_json::<Snapshot>(store, BASELINE_KEY) {
        Ok(snapshot) => {
            watch_debug!("Loaded baseline with {} records", snapshot.len());
            Ok(snapshot)
        }
        Err(err) if err.is_not_found() => {
            watch_debug!("No baseline stored yet, starting from an empty snapshot");
            Ok(Snapshot::new())
        }
        Err(err) => Err(err),
    }
}

pub fn save_baseline(store: &dyn BlobStore, snapshot: &[Record]) -> Result<(), StoreError> {
    save_json(store, BASELINE_KEY, snapshot)
}

pub(crate) fn load_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> Result<T, StoreError> {
    let bytes = store.load(key)?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    })
}

pub(crate) fn save_json<T: Serialize + ?Sized>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(|err| StoreError::storage(key, err.to_string()))?;
    store.save(key, &bytes)
}
