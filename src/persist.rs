//! Snapshot Persistence Module
//!
//! Serializes the full cache contents (entry map plus recency order) to a
//! single JSON file and restores them at construction. A save overwrites the
//! previous snapshot via a temp-file-and-rename so readers never observe a
//! partial write. Every failure on this path is recovered: the cache keeps
//! operating in memory and the failure is logged.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::cache::CacheEntry;
use crate::error::Result;

// == Cache Snapshot ==
/// A full point-in-time copy of the cache contents.
///
/// Entries are encoded as a pair list rather than a JSON map so arbitrary
/// key types round-trip. Recency is stored oldest first. A snapshot produced
/// by one instance can be loaded by a compatible instance of the same
/// version; no other format compatibility is promised.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSnapshot<K, V> {
    /// When this snapshot was written
    pub saved_at: DateTime<Utc>,
    /// Entry map contents, with absolute expiry timestamps
    pub entries: Vec<(K, CacheEntry<V>)>,
    /// Recency order, least recently used first
    pub recency: Vec<K>,
}

// == Persistence Manager ==
/// Writes and restores cache snapshots at a fixed location.
#[derive(Debug)]
pub struct Persistence {
    /// Snapshot file location
    path: PathBuf,
    /// When false, save and load are no-ops
    enabled: bool,
}

impl Persistence {
    // == Constructor ==
    pub fn new(path: PathBuf, enabled: bool) -> Self {
        Self { path, enabled }
    }

    /// Whether snapshotting is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Save ==
    /// Serializes the entire cache state, overwriting any prior snapshot.
    ///
    /// Invoked at the end of every mutating operation while the caller still
    /// holds the cache's write lock, so the snapshot on disk always reflects
    /// the last completed mutation and never a half-updated tracker. The
    /// write goes to a temp file first and is renamed into place.
    pub async fn save<K, V>(&self, entries: Vec<(K, CacheEntry<V>)>, recency: Vec<K>) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        if !self.enabled {
            return Ok(());
        }

        let snapshot = CacheSnapshot {
            saved_at: Utc::now(),
            entries,
            recency,
        };
        let payload = serde_json::to_vec(&snapshot)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &payload).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(path = ?self.path, bytes = payload.len(), "Snapshot written");
        Ok(())
    }

    // == Load ==
    /// Reads the snapshot back, once, at construction time.
    ///
    /// A missing file means a first run; a corrupt or unreadable file is
    /// logged and treated the same way. Both cases start the cache empty,
    /// never failing construction.
    pub async fn load<K, V>(&self) -> Option<CacheSnapshot<K, V>>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        if !self.enabled {
            return None;
        }

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No snapshot found, starting empty");
                return None;
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read snapshot, starting empty");
                return None;
            }
        };

        match serde_json::from_slice::<CacheSnapshot<K, V>>(&bytes) {
            Ok(snapshot) => {
                info!(
                    path = ?self.path,
                    entries = snapshot.entries.len(),
                    saved_at = %snapshot.saved_at,
                    "Snapshot restored"
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Snapshot corrupt, starting empty");
                None
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_entries() -> Vec<(String, CacheEntry<String>)> {
        vec![
            ("a".to_string(), CacheEntry::new("1".to_string(), Duration::from_secs(60))),
            ("b".to_string(), CacheEntry::new("2".to_string(), Duration::from_secs(60))),
        ]
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_data.json");
        let persistence = Persistence::new(path.clone(), true);

        let recency = vec!["a".to_string(), "b".to_string()];
        persistence.save(sample_entries(), recency.clone()).await.unwrap();
        assert!(path.exists());

        let snapshot = persistence.load::<String, String>().await.unwrap();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.recency, recency);
        let (key, entry) = &snapshot.entries[0];
        assert!(key == "a" || key == "b");
        assert!(!entry.is_expired());
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_none() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("missing.json"), true);

        assert!(persistence.load::<String, String>().await.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_data.json");
        fs::write(&path, b"not json at all").await.unwrap();

        let persistence = Persistence::new(path, true);
        assert!(persistence.load::<String, String>().await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_prior_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_data.json");
        let persistence = Persistence::new(path, true);

        persistence
            .save(sample_entries(), vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        persistence
            .save::<String, String>(vec![], vec![])
            .await
            .unwrap();

        let snapshot = persistence.load::<String, String>().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.recency.is_empty());
    }

    #[tokio::test]
    async fn test_save_is_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_data.json");
        let temp_path = path.with_extension("tmp");
        let persistence = Persistence::new(path.clone(), true);

        persistence
            .save(sample_entries(), vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        // Temp file should not exist after save
        assert!(!temp_path.exists());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_disabled_persistence_is_a_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_data.json");
        let persistence = Persistence::new(path.clone(), false);

        persistence
            .save(sample_entries(), vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(!path.exists());
        assert!(persistence.load::<String, String>().await.is_none());
    }
}
