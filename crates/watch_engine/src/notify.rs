use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use watch_core::Record;
use watch_logging::watch_info;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::Digest;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("could not write digest: {0}")]
    Outbox(#[from] PersistError),
    #[error("could not encode digest: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("notification rejected with http status {0}")]
    Rejected(u16),
}

/// Delivers a batch of differences to the user.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, differences: &[Record]) -> Result<(), NotifyError>;
}

/// Writes one log line per difference.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, differences: &[Record]) -> Result<(), NotifyError> {
        for item in differences {
            match item.old_price {
                Some(old_price) => watch_info!(
                    "Price drop: {} ${} (was ${}, list ${}) {}",
                    item.name,
                    item.price,
                    old_price,
                    item.original_price,
                    item.url
                ),
                None => watch_info!(
                    "New item: {} ${} (list ${}) {}",
                    item.name,
                    item.price,
                    item.original_price,
                    item.url
                ),
            }
        }
        Ok(())
    }
}

/// Drops each digest as an HTML file into a directory.
pub struct OutboxNotifier {
    writer: AtomicFileWriter,
    ignore_base_url: String,
    now: Arc<dyn Fn() -> i64 + Send + Sync>,
}

impl OutboxNotifier {
    pub fn new(
        dir: PathBuf,
        ignore_base_url: impl Into<String>,
        now: Arc<dyn Fn() -> i64 + Send + Sync>,
    ) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            ignore_base_url: ignore_base_url.into(),
            now,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, differences: &[Record]) -> Result<(), NotifyError> {
        let digest = Digest::build(differences, &self.ignore_base_url);
        let filename = format!("digest-{}.html", (self.now)());
        let page = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
            digest.subject, digest.html
        );
        let path = self.writer.write(&filename, page.as_bytes())?;
        watch_info!("Wrote digest for {} items to {:?}", differences.len(), path);
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    html: &'a str,
    items: &'a [Record],
}

/// Posts the digest as JSON to an HTTP endpoint (mail relay, chat hook, ...).
pub struct WebhookNotifier {
    url: String,
    ignore_base_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(
        url: impl Into<String>,
        ignore_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self {
            url: url.into(),
            ignore_base_url: ignore_base_url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, differences: &[Record]) -> Result<(), NotifyError> {
        let digest = Digest::build(differences, &self.ignore_base_url);
        let body = serde_json::to_vec(&WebhookPayload {
            subject: &digest.subject,
            html: &digest.html,
            items: differences,
        })?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        watch_info!("Posted digest for {} items to webhook", differences.len());
        Ok(())
    }
}
