use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{interval, MissedTickBehavior};
use url::Url;
use watch_core::system_now;
use watch_engine::{
    run_cycle, CycleContext, FsBlobStore, LogNotifier, Notifier, OutboxNotifier,
    ProductExtractor, ReqwestFetcher, ScrapingCatalog, WebhookNotifier,
};
use watch_logging::{watch_info, watch_warn};

use crate::config::{NotifierConfig, WatchConfig};

/// Wires the collaborators named in `config` into a cycle context.
pub fn build_context(config: &WatchConfig) -> Result<CycleContext> {
    let base_url = match config.public_base_url.trim() {
        "" => None,
        raw => Some(Url::parse(raw).with_context(|| format!("Invalid public_base_url {raw:?}"))?),
    };
    let fetcher = Arc::new(
        ReqwestFetcher::new(config.fetch.to_settings()).context("Invalid fetch settings")?,
    );
    let catalog = Arc::new(ScrapingCatalog::new(fetcher, ProductExtractor::new(base_url)));
    let now: Arc<dyn Fn() -> i64 + Send + Sync> = Arc::new(system_now);

    let notifier: Arc<dyn Notifier> = match &config.notifier {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Outbox { dir } => Arc::new(OutboxNotifier::new(
            dir.clone(),
            config.ignore_base_url.clone(),
            now.clone(),
        )),
        NotifierConfig::Webhook { url, timeout_secs } => Arc::new(
            WebhookNotifier::new(
                url.clone(),
                config.ignore_base_url.clone(),
                Duration::from_secs(*timeout_secs),
            )
            .context("Failed to set up webhook notifier")?,
        ),
    };

    Ok(CycleContext {
        source_url: config.source_url.clone(),
        catalog,
        store: Arc::new(FsBlobStore::new(config.data_dir.clone())),
        notifier,
        now,
    })
}

/// Runs a cycle now and then once per `every`, forever.
///
/// Failed cycles are logged by the cycle and the loop carries on with the next tick.
pub async fn watch_loop(ctx: CycleContext, every: Duration) {
    watch_info!("Checking {} every {:?}", ctx.source_url, every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = run_cycle(&ctx).await {
            if !err.is_transient() {
                watch_warn!("Cycle keeps failing until the {} stage is fixed", err.stage());
            }
        }
    }
}
