//! # tactics_core - FM26 Tactics Catalog
//!
//! Loads the published tactics catalog (site meta, tactics, glossary and
//! patch notes) with a primary/fallback retrieval policy and a local snapshot
//! cache, then serves indexed lookups, faceted search and route dispatch.
//!
//! ## Features
//! - Single-retry fallback retrieval over HTTP or the local file system
//! - MessagePack + LZ4 snapshot cache with TTL and data-version check
//! - Slug, style, formation, patch and glossary indices
//! - Filter/sort engine, comparisons and recommendations

pub mod cache;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod models;
pub mod pitch;
pub mod recommend;
pub mod retriever;
pub mod router;
pub mod search;
pub mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::{Freshness, LocalCache, Snapshot, SnapshotStorage};
pub use catalog::CatalogStore;
pub use config::CatalogConfig;
pub use error::{CacheError, CatalogError, ConfigError, Result, RetrievalError, RouteHandlerError};
pub use models::{Dataset, GlossaryTerm, Patch, SiteMeta, Tactic, Version};
pub use retriever::{DocumentRetriever, Transport};
pub use router::{RouteParams, Router};
pub use search::{SortKey, TacticCriteria};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
