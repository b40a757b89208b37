use watch_logging::{watch_debug, watch_info};

use crate::snapshot::{load_json, save_json};
use crate::{BlobStore, ItemId, StoreError};

/// Key under which muted ids are persisted.
pub const MUTE_KEY: &str = "snooze.json";

/// Permanent per-id suppression list.
///
/// Loaded fresh for every operation and never cached. Mutes cannot be removed.
pub struct MuteRegistry<'a> {
    store: &'a dyn BlobStore,
    ids: Vec<ItemId>,
}

impl<'a> MuteRegistry<'a> {
    /// Loads the registry from `store`.
    ///
    /// A store that has never held a registry yields an empty one. Unreadable
    /// or corrupt data is an error; it is never read as "nothing muted".
    pub fn load(store: &'a dyn BlobStore) -> Result<Self, StoreError> {
        let ids = match load_json::<Vec<ItemId>>(store, MUTE_KEY) {
            Ok(ids) => ids,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err),
        };
        watch_debug!("Loaded mute registry with {} ids", ids.len());
        Ok(Self { store, ids })
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    /// Mutes `id`, returning whether it was already muted.
    ///
    /// New ids are appended and persisted before returning; known ids cause no write.
    pub fn add(&mut self, id: ItemId) -> Result<bool, StoreError> {
        if self.contains(&id) {
            return Ok(true);
        }
        self.ids.push(id);
        if let Err(err) = save_json(self.store, MUTE_KEY, &self.ids) {
            self.ids.pop();
            return Err(err);
        }
        if let Some(added) = self.ids.last() {
            watch_info!("Muted item {} ({} muted in total)", added, self.ids.len());
        }
        Ok(false)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
