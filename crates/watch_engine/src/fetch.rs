use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use watch_logging::watch_debug;

use crate::{CatalogPage, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Sent with every request. The catalog rejects clients that do not look like a browser.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 8 * 1024 * 1024,
            headers: default_headers(),
        }
    }
}

pub fn default_headers() -> Vec<(String, String)> {
    [
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "max-age=0"),
        ("upgrade-insecure-requests", "1"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        (
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        ),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Downloads a catalog page.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<CatalogPage, FetchError>;
}

/// HTTP fetcher sharing one client (and its connection pool) across cycles.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestFetcher {
    /// Fails when a configured header is not a valid HTTP header.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .default_headers(header_map(&settings.headers)?)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
        })
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let oversized = || {
            FetchError::new(
                FailureKind::Oversized {
                    limit: self.max_bytes,
                },
                "catalog page exceeds the size limit",
            )
        };
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(oversized());
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(oversized());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<CatalogPage, FetchError> {
        let url = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::BadRequest, format!("{url:?}: {err}")))?;

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        check_status(response.status())?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type.as_deref() {
            if !is_html(content_type) {
                return Err(FetchError::new(
                    FailureKind::NotHtml(content_type.to_string()),
                    "expected a catalog page",
                ));
            }
        }

        let final_url = response.url().to_string();
        let body = self.read_body(response).await?;
        watch_debug!("Downloaded {} bytes from {}", body.len(), final_url);

        Ok(CatalogPage {
            body,
            content_type,
            final_url,
        })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |err: &dyn std::fmt::Display| {
            FetchError::new(FailureKind::BadRequest, format!("header {name}: {err}"))
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid(&err))?;
        let header_value = HeaderValue::from_str(value).map_err(|err| invalid(&err))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    let kind = match status.as_u16() {
        code @ (401 | 403 | 429) => FailureKind::Blocked(code),
        code => FailureKind::HttpStatus(code),
    };
    Err(FetchError::new(kind, status.to_string()))
}

fn is_html(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/html") || essence.eq_ignore_ascii_case("application/xhtml+xml")
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::TooManyRedirects
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
