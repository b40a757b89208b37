use std::sync::Arc;

use watch_core::Snapshot;
use watch_logging::{watch_debug, watch_warn};

use crate::{decode_page, FailureKind, FetchError, Fetcher, ProductExtractor};

/// Produces the observed snapshot for a catalog page.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_observed(&self, source_url: &str) -> Result<Snapshot, FetchError>;
}

/// Downloads the page, decodes it and scrapes the product tiles.
pub struct ScrapingCatalog {
    fetcher: Arc<dyn Fetcher>,
    extractor: ProductExtractor,
}

impl ScrapingCatalog {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: ProductExtractor) -> Self {
        Self { fetcher, extractor }
    }
}

#[async_trait::async_trait]
impl CatalogSource for ScrapingCatalog {
    async fn fetch_observed(&self, source_url: &str) -> Result<Snapshot, FetchError> {
        let page = self.fetcher.fetch(source_url).await?;
        let decoded = decode_page(&page.body, page.content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        watch_debug!(
            "Decoded {} bytes as {} from {}",
            page.body.len(),
            decoded.encoding_label,
            page.final_url
        );

        let observed = self
            .extractor
            .extract(&decoded.html)
            .map_err(|err| FetchError::new(FailureKind::Parse, err.to_string()))?;
        if observed.is_empty() {
            watch_warn!("No products found on {}", page.final_url);
        }
        Ok(observed)
    }
}
