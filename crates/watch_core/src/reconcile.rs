use watch_logging::watch_debug;

use crate::{Difference, Snapshot};

/// Current wall-clock time in epoch milliseconds.
pub fn system_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Folds `differences` into `baseline`, producing the next baseline.
///
/// Differences are applied in order and each one sees the effect of the
/// previous ones, so a name appended earlier in the batch is matched by later
/// entries. New names are appended with a fresh change timestamp; known names
/// take the lower price and a fresh timestamp. Anything else is left alone,
/// including baseline records that no longer appear in the catalog.
pub fn reconcile(
    mut baseline: Snapshot,
    differences: &[Difference],
    now: &dyn Fn() -> i64,
) -> Snapshot {
    for difference in differences {
        match baseline
            .iter_mut()
            .find(|known| known.name == difference.name)
        {
            None => {
                let mut added = difference.clone();
                added.old_price = None;
                added.change_timestamp = Some(now());
                watch_debug!("Baseline gains {} at {}", added.name, added.price);
                baseline.push(added);
            }
            Some(known) if difference.price < known.price => {
                watch_debug!(
                    "Baseline price of {} lowered from {} to {}",
                    known.name,
                    known.price,
                    difference.price
                );
                known.price = difference.price;
                known.change_timestamp = Some(advance(known.change_timestamp, now()));
            }
            Some(_) => {}
        }
    }
    baseline
}

// Change timestamps never move backwards, even if the clock does.
fn advance(previous: Option<i64>, now: i64) -> i64 {
    previous.map_or(now, |previous| previous.max(now))
}
