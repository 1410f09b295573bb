use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::SNAPSHOT_VERSION;
use crate::error::CacheError;
use crate::models::{Dataset, GlossaryTerm, Patch, SiteMeta, Tactic};

const CHECKSUM_LEN: usize = 32;

/// A persisted copy of the whole catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Envelope format version
    pub version: u32,

    pub meta: SiteMeta,
    pub tactics: Vec<Tactic>,
    pub glossary: Vec<GlossaryTerm>,
    pub patches: Vec<Patch>,

    /// `meta.siteConfig.dataVersion` at the time of the write
    pub data_version: String,

    /// Write time (unix milliseconds)
    pub timestamp: u64,
}

impl Snapshot {
    pub fn from_dataset(dataset: &Dataset, timestamp: u64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            meta: dataset.meta.clone(),
            tactics: dataset.tactics.clone(),
            glossary: dataset.glossary.clone(),
            patches: dataset.patches.clone(),
            data_version: dataset.meta.data_version().to_string(),
            timestamp,
        }
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset {
            meta: self.meta,
            tactics: self.tactics,
            glossary: self.glossary,
            patches: self.patches,
        }
    }

    /// Milliseconds elapsed at `now`. Saturates for clocks that went backwards.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

/// MessagePack, LZ4 with prepended size, trailing SHA256.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, CacheError> {
    let msgpack = to_vec_named(snapshot)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut bytes = compressed;
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, CacheError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(CacheError::Corrupted);
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize()[..] != *checksum {
        return Err(CacheError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| CacheError::Decompression)?;
    let snapshot: Snapshot = from_slice(&msgpack)?;

    if snapshot.version > SNAPSHOT_VERSION {
        return Err(CacheError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    Ok(snapshot)
}
