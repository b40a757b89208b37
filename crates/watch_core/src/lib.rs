//! Watcher core: catalog snapshots, change detection and baseline reconciliation.
//!
//! Nothing in here talks to the network. Storage is reached through the
//! [`BlobStore`] trait so every operation can be driven from an in-memory store.
mod diff;
mod mute;
mod reconcile;
mod record;
mod snapshot;
mod store;

pub use diff::{compute_differences, detect_differences};
pub use mute::{MuteRegistry, MUTE_KEY};
pub use reconcile::{reconcile, system_now};
pub use record::{Difference, ItemId, Record, Snapshot};
pub use snapshot::{load_baseline, save_baseline, BASELINE_KEY};
pub use store::{BlobStore, MemoryBlobStore, StoreError};
