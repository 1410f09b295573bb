use thiserror::Error;

/// Failure to obtain a named document.
///
/// Only the `BothFailed` form (or a single-attempt failure when primary and
/// fallback bases coincide) escapes the retriever.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Transport error for {location}: {message}")]
    Transport { location: String, message: String },

    #[error("HTTP {status} for {location}")]
    Status { location: String, status: u16 },

    #[error("IO error reading {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fallback also failed for {name}: {fallback} (primary: {primary})")]
    BothFailed {
        name: String,
        primary: Box<RetrievalError>,
        fallback: Box<RetrievalError>,
    },
}

impl RetrievalError {
    /// HTTP status behind this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RetrievalError::Status { status, .. } => Some(*status),
            RetrievalError::BothFailed { fallback, .. } => fallback.status(),
            _ => None,
        }
    }
}

/// Snapshot persistence failures. Never surfaced past the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted snapshot")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Snapshot format mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Snapshot too large: {size} bytes (limit {limit})")]
    CapacityExceeded { size: usize, limit: usize },
}

impl CacheError {
    /// True for failures that happen while reading a persisted snapshot.
    pub fn is_read_failure(&self) -> bool {
        match self {
            CacheError::Decode(_) => true,
            CacheError::Decompression => true,
            CacheError::Corrupted => true,
            CacheError::ChecksumMismatch => true,
            CacheError::VersionMismatch { .. } => true,
            CacheError::Io(_) => true,
            CacheError::Encode(_) => false,
            CacheError::CapacityExceeded { .. } => false,
        }
    }
}

/// Raised by a route handler. The dispatcher recovers from it.
#[derive(Error, Debug)]
pub enum RouteHandlerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Render error: {0}")]
    Render(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that reach the caller of [`CatalogStore::load_all`](crate::catalog::CatalogStore::load_all).
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reaches_through_fallback() {
        let err = RetrievalError::BothFailed {
            name: "tactics.json".to_string(),
            primary: Box::new(RetrievalError::Transport {
                location: "https://cdn/tactics.json".to_string(),
                message: "connection refused".to_string(),
            }),
            fallback: Box::new(RetrievalError::Status {
                location: "./data/tactics.json".to_string(),
                status: 404,
            }),
        };

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_cache_error_classification() {
        assert!(CacheError::ChecksumMismatch.is_read_failure());
        assert!(CacheError::VersionMismatch { found: 9, expected: 1 }.is_read_failure());
        assert!(!CacheError::CapacityExceeded { size: 10, limit: 5 }.is_read_failure());
    }
}
