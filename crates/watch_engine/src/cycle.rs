use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use watch_core::{
    detect_differences, load_baseline, reconcile, save_baseline, BlobStore, Difference, ItemId,
    MuteRegistry, StoreError,
};
use watch_logging::{watch_error, watch_info, watch_warn};

use crate::{CatalogSource, FetchError, Notifier, NotifyError};

static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

/// Everything one check cycle needs. Built per invocation; holds no state of its own.
#[derive(Clone)]
pub struct CycleContext {
    pub source_url: String,
    pub catalog: Arc<dyn CatalogSource>,
    pub store: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
    pub now: Arc<dyn Fn() -> i64 + Send + Sync>,
}

/// Failure of a check cycle, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Error loading baseline: {0}")]
    Baseline(StoreError),
    #[error("Error fetching catalog: {0}")]
    Fetch(FetchError),
    #[error("Error loading mute registry: {0}")]
    MuteRegistry(StoreError),
    #[error("Error sending notification: {0}")]
    Notify(NotifyError),
    #[error("Error persisting baseline: {0}")]
    Persist(StoreError),
}

impl CycleError {
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Baseline(_) => "baseline",
            CycleError::Fetch(_) => "fetch",
            CycleError::MuteRegistry(_) => "mute registry",
            CycleError::Notify(_) => "notify",
            CycleError::Persist(_) => "persist",
        }
    }

    /// Whether waiting for the next scheduled cycle is likely to help.
    pub fn is_transient(&self) -> bool {
        match self {
            CycleError::Fetch(err) => err.kind.is_transient(),
            CycleError::Notify(NotifyError::Transport(_)) => true,
            CycleError::Notify(NotifyError::Rejected(status)) => *status >= 500,
            _ => false,
        }
    }
}

/// Runs one check: load baseline, fetch, diff, notify, reconcile, persist.
///
/// Returns the differences that were found (possibly none). Notification
/// happens before the baseline is touched, so a failed notification leaves
/// the baseline as it was and the same differences are found next time.
/// Nothing guards against a concurrent cycle; the last one to persist wins.
pub async fn run_cycle(ctx: &CycleContext) -> Result<Vec<Difference>, CycleError> {
    let run = NEXT_RUN.fetch_add(1, Ordering::Relaxed);
    watch_info!("[run {run}] Checking {}", ctx.source_url);

    let result = check(ctx, run).await;
    match &result {
        Ok(differences) => watch_info!("[run {run}] Done, {} differences", differences.len()),
        Err(err) if err.is_transient() => {
            watch_warn!("[run {run}] Failed at {} stage, will retry: {err}", err.stage())
        }
        Err(err) => watch_error!("[run {run}] Failed at {} stage: {err}", err.stage()),
    }
    result
}

async fn check(ctx: &CycleContext, run: u64) -> Result<Vec<Difference>, CycleError> {
    let baseline = load_baseline(ctx.store.as_ref()).map_err(CycleError::Baseline)?;
    let observed = ctx
        .catalog
        .fetch_observed(&ctx.source_url)
        .await
        .map_err(CycleError::Fetch)?;
    watch_info!(
        "[run {run}] Observed {} items against a baseline of {}",
        observed.len(),
        baseline.len()
    );

    let differences = detect_differences(ctx.store.as_ref(), &baseline, &observed)
        .map_err(CycleError::MuteRegistry)?;
    if differences.is_empty() {
        return Ok(differences);
    }

    ctx.notifier
        .notify(&differences)
        .await
        .map_err(CycleError::Notify)?;

    let next = reconcile(baseline, &differences, ctx.now.as_ref());
    save_baseline(ctx.store.as_ref(), &next).map_err(CycleError::Persist)?;
    watch_info!("[run {run}] Persisted baseline with {} items", next.len());
    Ok(differences)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuteOutcome {
    Muted(ItemId),
    AlreadyMuted(ItemId),
}

impl fmt::Display for MuteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuteOutcome::Muted(id) => write!(f, "item with id {id} snoozed"),
            MuteOutcome::AlreadyMuted(id) => {
                write!(f, "item with id {id} had already been snoozed")
            }
        }
    }
}

/// Handles a mute request. Safe to repeat with the same id.
pub fn mute_item(store: &dyn BlobStore, id: ItemId) -> Result<MuteOutcome, StoreError> {
    let mut registry = MuteRegistry::load(store)?;
    let already_present = registry.add(id.clone())?;
    Ok(if already_present {
        MuteOutcome::AlreadyMuted(id)
    } else {
        MuteOutcome::Muted(id)
    })
}
