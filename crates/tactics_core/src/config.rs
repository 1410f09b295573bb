//! Catalog configuration
//!
//! Defaults work out of the box against a local `./data` directory. A YAML
//! file and `FM26_*` environment variables can override any field.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::error::ConfigError;

/// Remote base for data documents.
pub const DATA_URL_ENV: &str = "FM26_DATA_URL";
/// Local data directory, also the fallback base.
pub const DATA_DIR_ENV: &str = "FM26_DATA_DIR";
/// Directory for the snapshot cache.
pub const CACHE_DIR_ENV: &str = "FM26_CACHE_DIR";
/// `1`/`true`/`yes` pins retrieval to the local data directory.
pub const OFFLINE_ENV: &str = "FM26_OFFLINE";

pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Remote base URL; replaced by `siteConfig.baseDataUrl` once known
    pub data_url: Option<String>,
    pub data_dir: String,
    /// Never leave `data_dir`
    pub offline: bool,
    /// Snapshot directory; in-memory cache when unset
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub cache_max_bytes: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_url: None,
            data_dir: DEFAULT_DATA_DIR.to_string(),
            offline: false,
            cache_dir: None,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            cache_max_bytes: None,
            request_timeout_secs: Some(30),
        }
    }
}

impl CatalogConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {:?}", path);
        Self::from_yaml_str(&yaml)
    }

    /// Apply `FM26_*` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        if let Some(url) = var(DATA_URL_ENV) {
            self.data_url = Some(url);
        }
        if let Some(dir) = var(DATA_DIR_ENV) {
            self.data_dir = dir;
        }
        if let Some(dir) = var(CACHE_DIR_ENV) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = var(OFFLINE_ENV) {
            self.offline = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Where documents are requested first.
    pub fn primary_base(&self) -> String {
        match (&self.data_url, self.offline) {
            (Some(url), false) => url.clone(),
            _ => self.data_dir.clone(),
        }
    }

    pub fn fallback_base(&self) -> String {
        self.data_dir.clone()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
