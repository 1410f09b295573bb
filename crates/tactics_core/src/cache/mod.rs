// Local snapshot cache
// MessagePack + LZ4 envelope with SHA256 trailer, TTL and data-version gate

pub mod format;
pub mod storage;

pub use format::{decode_snapshot, encode_snapshot, Snapshot};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};

use std::sync::Arc;
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::error::CacheError;

pub const CACHE_KEY: &str = "fm26_tactics_cache";
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const SNAPSHOT_VERSION: u32 = 1;

type Diagnostics = Box<dyn Fn(&CacheError) + Send + Sync>;

/// What is known about the remote data version at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The remote currently publishes this `dataVersion`.
    Current(String),
    /// The remote could not be asked.
    Unavailable,
}

pub struct LocalCache {
    storage: Arc<dyn SnapshotStorage>,
    ttl: Duration,
    diagnostics: Option<Diagnostics>,
}

impl LocalCache {
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self { storage, ttl: DEFAULT_TTL, diagnostics: None }
    }

    /// File-backed cache, or memory-backed when no cache dir is configured.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let storage: Arc<dyn SnapshotStorage> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStorage::new(dir).with_max_bytes(config.cache_max_bytes)),
            None => Arc::new(match config.cache_max_bytes {
                Some(limit) => MemoryStorage::with_capacity(limit),
                None => MemoryStorage::new(),
            }),
        };
        Self::new(storage).with_ttl(config.cache_ttl())
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Called with every storage failure the cache swallows.
    pub fn with_diagnostics(mut self, hook: impl Fn(&CacheError) + Send + Sync + 'static) -> Self {
        self.diagnostics = Some(Box::new(hook));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stored snapshot still inside its TTL, if any.
    ///
    /// Missing, unreadable and expired entries all read as `None`; unreadable
    /// ones are reported to diagnostics.
    pub fn candidate(&self, now_ms: u64) -> Option<Snapshot> {
        let bytes = match self.storage.read(CACHE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                self.report(&e);
                return None;
            }
        };

        let snapshot = match decode_snapshot(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.report(&e);
                return None;
            }
        };

        if snapshot.data_version.is_empty() {
            log::debug!("Cached snapshot has no data version, ignoring");
            return None;
        }

        let age = snapshot.age_ms(now_ms);
        if u128::from(age) >= self.ttl.as_millis() {
            log::debug!("Cached snapshot expired ({} ms old)", age);
            return None;
        }

        Some(snapshot)
    }

    /// Accept or reject a candidate against the remote data version.
    pub fn accept(&self, candidate: Snapshot, freshness: &Freshness) -> Option<Snapshot> {
        match freshness {
            Freshness::Current(version) if *version == candidate.data_version => {
                log::info!("Using cached data (version {})", candidate.data_version);
                Some(candidate)
            }
            Freshness::Current(version) => {
                log::info!(
                    "Cached data version {} superseded by {}",
                    candidate.data_version,
                    version
                );
                None
            }
            Freshness::Unavailable => {
                log::warn!(
                    "Could not verify data version, using cached data (version {})",
                    candidate.data_version
                );
                Some(candidate)
            }
        }
    }

    pub fn try_load(&self, now_ms: u64, freshness: &Freshness) -> Option<Snapshot> {
        self.candidate(now_ms).and_then(|candidate| self.accept(candidate, freshness))
    }

    /// Persist `snapshot`. Failures are logged and reported, never returned.
    pub fn store(&self, snapshot: &Snapshot) {
        let result = encode_snapshot(snapshot)
            .and_then(|bytes| self.storage.write(CACHE_KEY, &bytes).map(|()| bytes.len()));

        match result {
            Ok(size) => log::debug!("Cached data version {} ({} bytes)", snapshot.data_version, size),
            Err(e) => {
                log::warn!("Could not cache data: {}", e);
                self.report(&e);
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(CACHE_KEY) {
            log::warn!("Could not clear cache: {}", e);
            self.report(&e);
        }
    }

    fn report(&self, error: &CacheError) {
        if let Some(hook) = &self.diagnostics {
            hook(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::Dataset;
    use std::sync::Mutex;

    const HOUR_MS: u64 = 3_600_000;

    fn snapshot_at(timestamp: u64) -> Snapshot {
        Snapshot::from_dataset(&fixtures::dataset(), timestamp)
    }

    fn recording_cache(storage: Arc<dyn SnapshotStorage>) -> (LocalCache, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cache = LocalCache::new(storage)
            .with_diagnostics(move |e| sink.lock().unwrap().push(e.to_string()));
        (cache, seen)
    }

    #[test]
    fn test_store_then_load_without_retrieval() {
        let cache = LocalCache::new(Arc::new(MemoryStorage::new()));
        let snapshot = snapshot_at(1_000);

        cache.store(&snapshot);
        let loaded = cache.try_load(1_000 + 60_000, &Freshness::Current("3".to_string())).unwrap();

        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.into_dataset(), fixtures::dataset());
    }

    #[test]
    fn test_ttl_boundary() {
        let cache = LocalCache::new(Arc::new(MemoryStorage::new()));
        cache.store(&snapshot_at(0));

        assert!(cache.candidate(HOUR_MS - 1).is_some());
        assert!(cache.candidate(HOUR_MS).is_none());
        assert!(cache.candidate(HOUR_MS + 1).is_none());
    }

    #[test]
    fn test_custom_ttl() {
        let cache =
            LocalCache::new(Arc::new(MemoryStorage::new())).with_ttl(Duration::from_secs(10));
        cache.store(&snapshot_at(0));

        assert!(cache.candidate(9_999).is_some());
        assert!(cache.candidate(10_000).is_none());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let cache = LocalCache::new(Arc::new(MemoryStorage::new()));
        cache.store(&snapshot_at(0));

        assert!(cache.try_load(10, &Freshness::Current("4".to_string())).is_none());
    }

    #[test]
    fn test_unverifiable_version_accepted() {
        let cache = LocalCache::new(Arc::new(MemoryStorage::new()));
        cache.store(&snapshot_at(0));

        assert!(cache.try_load(10, &Freshness::Unavailable).is_some());
    }

    #[test]
    fn test_empty_data_version_ignored() {
        let cache = LocalCache::new(Arc::new(MemoryStorage::new()));
        let mut snapshot = Snapshot::from_dataset(&Dataset::default(), 0);
        snapshot.data_version.clear();
        cache.store(&snapshot);

        assert!(cache.candidate(10).is_none());
    }

    #[test]
    fn test_corrupted_entry_reported() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put_raw(CACHE_KEY, vec![0u8; 64]);
        let (cache, seen) = recording_cache(storage);

        assert!(cache.candidate(0).is_none());
        assert_eq!(seen.lock().unwrap().as_slice(), ["Checksum mismatch"]);
    }

    #[test]
    fn test_rejected_write_is_swallowed() {
        let (cache, seen) = recording_cache(Arc::new(MemoryStorage::with_capacity(16)));

        cache.store(&snapshot_at(0));

        assert!(cache.candidate(0).is_none());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("Snapshot too large"));
    }

    #[test]
    fn test_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = LocalCache::new(storage.clone());
        cache.store(&snapshot_at(0));
        assert!(storage.contains(CACHE_KEY));

        cache.clear();
        assert!(!storage.contains(CACHE_KEY));
    }
}
