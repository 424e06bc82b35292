//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_size: usize,
    /// Location of the snapshot file
    pub persistence_path: PathBuf,
    /// Whether snapshots are written and expiry timers armed.
    /// When false, no disk I/O happens and TTL is only enforced lazily on get.
    pub persistence_enabled: bool,
    /// Upper bound on how long a cache-miss get waits for the async loader
    pub load_timeout: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `PERSISTENCE_PATH` - Snapshot file location (default: cache_data.json)
    /// - `PERSISTENCE_ENABLED` - Enable snapshotting and expiry timers (default: false)
    /// - `LOAD_TIMEOUT_SECS` - Async loader timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            max_size: env::var("MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            persistence_path: env::var("PERSISTENCE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cache_data.json")),
            persistence_enabled: env::var("PERSISTENCE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            load_timeout: env::var("LOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
        }
    }

    /// Checks the configuration for values the cache cannot operate with.
    ///
    /// Called at construction; the only place a hard error is produced.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be a positive integer".to_string(),
            ));
        }
        if self.persistence_enabled && self.persistence_path.as_os_str().is_empty() {
            return Err(CacheError::InvalidConfig(
                "persistence_path must be set when persistence is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            persistence_path: PathBuf::from("cache_data.json"),
            persistence_enabled: false,
            load_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 1000);
        assert_eq!(config.persistence_path, PathBuf::from("cache_data.json"));
        assert!(!config.persistence_enabled);
        assert_eq!(config.load_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MAX_SIZE");
        env::remove_var("PERSISTENCE_PATH");
        env::remove_var("PERSISTENCE_ENABLED");
        env::remove_var("LOAD_TIMEOUT_SECS");

        let config = CacheConfig::from_env();
        assert_eq!(config.max_size, 1000);
        assert_eq!(config.persistence_path, PathBuf::from("cache_data.json"));
        assert!(!config.persistence_enabled);
        assert_eq!(config.load_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_validate_ok() {
        assert!(CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_max_size() {
        let config = CacheConfig {
            max_size: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_empty_persistence_path() {
        let config = CacheConfig {
            persistence_enabled: true,
            persistence_path: PathBuf::new(),
            ..CacheConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
