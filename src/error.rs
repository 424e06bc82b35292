//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// `NotFound` and `Expired` are internal store signals: `MicroCache::get`
/// turns both into a loader fallthrough and never surfaces them. `Io` and
/// `Snapshot` come from the persistence path and are always recovered and
/// logged. `InvalidConfig` is the only hard failure, and only at
/// construction time.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid construction-time configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot contents could not be encoded or decoded
    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
