//! HTTP surface: on-demand checks and the "Ignore" links from notifications.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use watch_core::{Difference, ItemId};
use watch_engine::{mute_item, run_cycle, CycleContext};
use watch_logging::{watch_error, watch_info};

use crate::runner::watch_loop;

type AppState = Arc<CycleContext>;

async fn check_handler(
    State(ctx): State<AppState>,
) -> Result<Json<Vec<Difference>>, (StatusCode, String)> {
    run_cycle(&ctx)
        .await
        .map(Json)
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

async fn mute_handler(
    State(ctx): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, (StatusCode, String)> {
    let id = ItemId::new(id);
    if id.as_str().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "missing item id".to_string()));
    }
    match mute_item(ctx.store.as_ref(), id) {
        Ok(outcome) => {
            watch_info!("{}", outcome);
            Ok(outcome.to_string())
        }
        Err(err) => {
            watch_error!("Mute request failed: {}", err);
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

pub fn router(ctx: AppState) -> Router {
    Router::new()
        .route("/api/check", get(check_handler))
        .route("/api/mute/{id}", get(mute_handler))
        .with_state(ctx)
}

/// Serves the API on `port` while the periodic watch loop runs alongside.
pub async fn serve(ctx: CycleContext, port: u16, every: Duration) -> anyhow::Result<()> {
    let state = Arc::new(ctx.clone());
    let watcher = tokio::spawn(watch_loop(ctx, every));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    watch_info!("Listening on {}", listener.local_addr()?);
    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            watch_info!("Shutting down");
        })
        .await;
    watcher.abort();
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use watch_core::{MemoryBlobStore, Record, Snapshot, MUTE_KEY};
    use watch_engine::{CatalogSource, FetchError, LogNotifier};

    struct FixedCatalog(Snapshot);

    #[async_trait::async_trait]
    impl CatalogSource for FixedCatalog {
        async fn fetch_observed(&self, _source_url: &str) -> Result<Snapshot, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn state(store: Arc<MemoryBlobStore>, observed: Snapshot) -> AppState {
        Arc::new(CycleContext {
            source_url: "https://shop.example/clearance".to_string(),
            catalog: Arc::new(FixedCatalog(observed)),
            store,
            notifier: Arc::new(LogNotifier),
            now: Arc::new(|| 7_i64),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn mute_link_is_idempotent() {
        let store = Arc::new(MemoryBlobStore::new());
        let app = router(state(store.clone(), Vec::new()));

        let (status, body) = get(app.clone(), "/api/mute/682573").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "item with id 682573 snoozed");

        let (_, body) = get(app, "/api/mute/682573").await;
        assert_eq!(body, "item with id 682573 had already been snoozed");
        assert_eq!(store.get(MUTE_KEY), Some(br#"["682573"]"#.to_vec()));
    }

    #[tokio::test]
    async fn check_returns_the_differences() {
        let store = Arc::new(MemoryBlobStore::new());
        let app = router(state(store, vec![Record::new("GPU-A", "1", 250.0)]));

        let (status, body) = get(app, "/api/check").await;

        assert_eq!(status, StatusCode::OK);
        let differences: Vec<Record> = serde_json::from_str(&body).unwrap();
        assert_eq!(differences, vec![Record::new("GPU-A", "1", 250.0)]);
    }

    #[tokio::test]
    async fn check_failure_is_a_server_error() {
        let store = Arc::new(MemoryBlobStore::new().with_blob(MUTE_KEY, "{oops"));
        let app = router(state(store, vec![Record::new("GPU-A", "1", 250.0)]));

        let (status, body) = get(app, "/api/check").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.starts_with("Error loading mute registry"), "{body}");
    }
}
