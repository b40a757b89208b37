//! Configuration file handling.
//!
//! The file is RON. Every field is optional; missing fields take the defaults below.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use watch_engine::{default_headers, FetchSettings};

pub const DEFAULT_SOURCE_URL: &str = "https://www.microcenter.com/search/search_results.aspx?N=4294964290&prt=clearance&NTK=all&sortby=pricehigh";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Catalog page to watch.
    pub source_url: String,
    /// Base for relative product and image links found on the page.
    pub public_base_url: String,
    /// Prefix of the "Ignore" links in notifications; the item id is appended.
    pub ignore_base_url: String,
    /// Directory holding the baseline and mute registry blobs.
    pub data_dir: PathBuf,
    pub check_interval_secs: u64,
    pub fetch: FetchConfig,
    pub notifier: NotifierConfig,
    pub log_file: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            public_base_url: "https://www.microcenter.com".to_string(),
            ignore_base_url: "http://localhost:7878/api/mute/".to_string(),
            data_dir: PathBuf::from("./watch-data"),
            check_interval_secs: 300,
            fetch: FetchConfig::default(),
            notifier: NotifierConfig::default(),
            log_file: None,
        }
    }
}

impl WatchConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, source_url: Option<String>) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if let Some(source_url) = source_url {
            self.source_url = source_url;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.check_interval_secs == 0 {
            bail!("check_interval_secs must be at least 1");
        }
        if self.source_url.trim().is_empty() {
            bail!("source_url must not be empty");
        }
        if let NotifierConfig::Webhook { url, .. } = &self.notifier {
            if url.trim().is_empty() {
                bail!("webhook notifier needs a url");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub headers: Vec<(String, String)>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
            headers: default_headers(),
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            headers: self.headers.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotifierConfig {
    /// Log each difference.
    #[default]
    Log,
    /// Write an HTML digest per cycle into `dir`.
    Outbox { dir: PathBuf },
    /// POST the digest as JSON to `url`.
    Webhook { url: String, timeout_secs: u64 },
}

/// Loads the configuration at `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<WatchConfig> {
    let config = match fs::read_to_string(path) {
        Ok(text) => ron::from_str::<WatchConfig>(&text)
            .with_context(|| format!("Failed to parse config {:?}", path))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => WatchConfig::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read config {:?}", path));
        }
    };
    config.validate()?;
    Ok(config)
}

pub fn to_ron(config: &WatchConfig) -> Result<String> {
    ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())
        .context("Failed to serialize config")
}
