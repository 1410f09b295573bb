//! Document retrieval
//!
//! Fetches the named catalog documents from a primary base, retrying once
//! against a fixed fallback base. Bases are either `http(s)://` URLs or
//! local directories.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::error::RetrievalError;

pub const META_DOCUMENT: &str = "meta.json";
pub const TACTICS_DOCUMENT: &str = "tactics.json";
pub const GLOSSARY_DOCUMENT: &str = "glossary.json";
pub const PATCHES_DOCUMENT: &str = "patches.json";

/// Moves raw document bodies. Implementations decide what a location means.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, location: &str) -> Result<String, RetrievalError>;
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// HTTP(S) via reqwest, everything else from the file system.
pub struct DefaultTransport {
    client: reqwest::Client,
}

impl DefaultTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, RetrievalError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| RetrievalError::Transport {
            location: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for DefaultTransport {
    async fn get(&self, location: &str) -> Result<String, RetrievalError> {
        if !is_remote(location) {
            return tokio::fs::read_to_string(location)
                .await
                .map_err(|source| RetrievalError::Io { location: location.to_string(), source });
        }

        let transport_error = |e: reqwest::Error| RetrievalError::Transport {
            location: location.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(location).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport_error)
    }
}

/// In-memory documents keyed by full location.
///
/// Useful for bundled data and for exercising the load sequence without a
/// network. Records every requested location.
#[derive(Default)]
pub struct MemoryTransport {
    documents: Mutex<HashMap<String, Result<String, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: impl Into<String>, body: impl Into<String>) {
        self.lock_documents().insert(location.into(), Ok(body.into()));
    }

    /// Make `location` answer with a non-success status.
    pub fn fail(&self, location: impl Into<String>, status: u16) {
        self.lock_documents().insert(location.into(), Err(status));
    }

    pub fn remove(&self, location: &str) {
        self.lock_documents().remove(location);
    }

    /// Every location requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn lock_documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<String, u16>>> {
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, location: &str) -> Result<String, RetrievalError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(location.to_string());

        match self.lock_documents().get(location) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => {
                Err(RetrievalError::Status { location: location.to_string(), status: *status })
            }
            None => Err(RetrievalError::Transport {
                location: location.to_string(),
                message: "no such document".to_string(),
            }),
        }
    }
}

/// Two-location, single-retry document fetcher.
pub struct DocumentRetriever {
    transport: Arc<dyn Transport>,
    primary_base: String,
    fallback_base: String,
    local_only: bool,
}

impl DocumentRetriever {
    pub fn new(
        transport: Arc<dyn Transport>,
        primary_base: impl Into<String>,
        fallback_base: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            primary_base: primary_base.into(),
            fallback_base: fallback_base.into(),
            local_only: false,
        }
    }

    /// Retriever over [`DefaultTransport`] with bases taken from `config`.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, RetrievalError> {
        let transport = DefaultTransport::new(config.request_timeout())?;
        let mut retriever =
            Self::new(Arc::new(transport), config.primary_base(), config.fallback_base());
        retriever.local_only = config.offline;
        Ok(retriever)
    }

    /// Keep the primary base pinned, ignoring bases published in site meta.
    pub fn local_only(mut self, local_only: bool) -> Self {
        self.local_only = local_only;
        self
    }

    pub fn primary_base(&self) -> &str {
        &self.primary_base
    }

    pub fn fallback_base(&self) -> &str {
        &self.fallback_base
    }

    /// Adopt a primary base published by the site meta. No-op when local.
    pub fn adopt_published_base(&mut self, base: &str) {
        if self.local_only || base.trim().is_empty() || base == self.primary_base {
            return;
        }
        log::debug!("Switching primary data base to {}", base);
        self.primary_base = base.to_string();
    }

    /// Fetch and decode `name`, trying the fallback base once on failure.
    pub async fn retrieve<T: DeserializeOwned>(&self, name: &str) -> Result<T, RetrievalError> {
        let primary = join_location(&self.primary_base, name);
        let primary_err = match self.attempt(&primary, name).await {
            Ok(document) => return Ok(document),
            Err(e) => e,
        };

        let fallback = join_location(&self.fallback_base, name);
        if fallback == primary {
            return Err(primary_err);
        }

        log::warn!("Primary fetch failed for {}: {}", name, primary_err);
        self.attempt(&fallback, name).await.map_err(|fallback_err| RetrievalError::BothFailed {
            name: name.to_string(),
            primary: Box::new(primary_err),
            fallback: Box::new(fallback_err),
        })
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        location: &str,
        name: &str,
    ) -> Result<T, RetrievalError> {
        let body = self.transport.get(location).await?;
        serde_json::from_str(&body)
            .map_err(|source| RetrievalError::Decode { name: name.to_string(), source })
    }
}

pub fn join_location(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}
