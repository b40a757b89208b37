use watch_logging::watch_debug;

use crate::{BlobStore, Difference, MuteRegistry, Record, StoreError};

/// Compares an observed snapshot against the baseline.
///
/// Observed records are visited in their original order and matched to the
/// first baseline record with the same `name`. Unmatched records are new
/// items and are emitted unchanged. Matched records are emitted only when
/// strictly cheaper, carrying the baseline price in `old_price`. Muted ids
/// never produce a difference.
pub fn compute_differences(
    baseline: &[Record],
    observed: &[Record],
    muted: &MuteRegistry<'_>,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    for item in observed {
        if muted.contains(&item.id) {
            watch_debug!("Skipping muted item {} ({})", item.id, item.name);
            continue;
        }
        match baseline.iter().find(|known| known.name == item.name) {
            None => differences.push(item.clone()),
            Some(known) if item.price < known.price => {
                let mut dropped = item.clone();
                dropped.old_price = Some(known.price);
                differences.push(dropped);
            }
            Some(_) => {}
        }
    }
    differences
}

/// Loads the mute registry from `store` and computes the differences.
///
/// A registry that cannot be loaded fails the whole detection.
pub fn detect_differences(
    store: &dyn BlobStore,
    baseline: &[Record],
    observed: &[Record],
) -> Result<Vec<Difference>, StoreError> {
    let muted = MuteRegistry::load(store)?;
    Ok(compute_differences(baseline, observed, &muted))
}
