//! Key/value backends for encoded snapshots.

use std::collections::HashMap;
use std::fs::{remove_file, rename, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CacheError;

/// Byte storage keyed by name. A missing key reads as `Ok(None)`.
pub trait SnapshotStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// One file per key under `dir`, written atomically.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    max_bytes: Option<usize>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), max_bytes: None }
    }

    /// Refuse writes larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: Option<usize>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.dat", key))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => {
                log::debug!("Read {} bytes from {:?}", bytes.len(), path);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if let Some(limit) = self.max_bytes {
            if bytes.len() > limit {
                return Err(CacheError::CapacityExceeded { size: bytes.len(), limit });
            }
        }

        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &path)?;

        log::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage with an optional per-entry byte capacity.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Mutex::default(), capacity: Some(capacity) }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).contains_key(key)
    }

    /// Overwrite an entry directly, bypassing the capacity check.
    pub fn put_raw(&self, key: &str, bytes: Vec<u8>) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).insert(key.to_string(), bytes);
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if let Some(limit) = self.capacity {
            if bytes.len() > limit {
                return Err(CacheError::CapacityExceeded { size: bytes.len(), limit });
            }
        }
        self.put_raw(key, bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).remove(key);
        Ok(())
    }
}
