//! MicroCache Facade
//!
//! The public cache type: wires the store, the expiry timers, the async
//! loader and the persistence manager together behind put/get/remove/clear.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::persist::Persistence;
use crate::tasks::spawn_expiry_timer;

// == Collaborator Types ==
/// Invoked once per expiry-driven removal, with the expired key.
///
/// Runs on an internal timer task, so it must not block indefinitely.
pub type ExpiryCallback<K> = Arc<dyn Fn(&K) + Send + Sync>;

/// Invoked once per cache-miss get, on a blocking worker.
///
/// A failure here is swallowed into an absent result at the get boundary.
pub type LoaderFn<K, V> = Arc<dyn Fn(&K) -> anyhow::Result<V> + Send + Sync>;

// == MicroCache ==
/// An in-process key-value cache with TTL expiration, LRU eviction, async
/// load-on-miss and optional snapshot persistence.
///
/// Cloning produces another handle to the same cache. All operations on the
/// store and the recency tracker run under one write lock, and snapshot
/// writes happen inside that same exclusive scope, so the two structures
/// always agree on membership and the file on disk always reflects the last
/// completed mutation.
pub struct MicroCache<K, V> {
    /// The unified store, shared with expiry timers
    store: Arc<RwLock<CacheStore<K, V>>>,
    /// Snapshot writer/reader
    persistence: Arc<Persistence>,
    /// Caller-supplied expiry notification
    on_expiry: ExpiryCallback<K>,
    /// Caller-supplied value loader for misses
    loader: LoaderFn<K, V>,
    /// Upper bound on a single async load
    load_timeout: Duration,
    /// Flipped once by shutdown; pending timers exit when it trips
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<K, V> Clone for MicroCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            persistence: self.persistence.clone(),
            on_expiry: self.on_expiry.clone(),
            loader: self.loader.clone(),
            load_timeout: self.load_timeout,
            shutdown_tx: self.shutdown_tx.clone(),
            shutdown_rx: self.shutdown_rx.clone(),
        }
    }
}

impl<K, V> MicroCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache from configuration and the two caller-supplied
    /// collaborators.
    ///
    /// Validates the configuration (the only hard failure) and, when
    /// persistence is enabled, restores the prior snapshot. A missing or
    /// corrupt snapshot starts the cache empty. Restored entries keep their
    /// absolute expiry times but get no timers; they expire lazily on get.
    pub async fn with_config(
        config: CacheConfig,
        on_expiry: ExpiryCallback<K>,
        loader: LoaderFn<K, V>,
    ) -> Result<Self> {
        config.validate()?;

        let persistence = Arc::new(Persistence::new(
            config.persistence_path.clone(),
            config.persistence_enabled,
        ));

        let store = match persistence.load::<K, V>().await {
            Some(snapshot) => {
                CacheStore::restore(config.max_size, snapshot.entries, snapshot.recency)
            }
            None => CacheStore::new(config.max_size),
        };

        info!(
            max_size = config.max_size,
            persistence_enabled = config.persistence_enabled,
            entries = store.len(),
            "Cache initialized"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            persistence,
            on_expiry,
            loader,
            load_timeout: config.load_timeout,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        })
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`, expiring `ttl` from now.
    ///
    /// Evicts the least recently used entry when a new key would exceed
    /// capacity. When persistence is enabled, also arms a one-shot expiry
    /// timer and snapshots. With persistence off there are no timers at all
    /// and TTL is enforced lazily by get.
    pub async fn put(&self, key: K, value: V, ttl: Duration) {
        let mut store = self.store.write().await;

        if let Some(evicted) = store.put(key.clone(), value, ttl) {
            debug!(key = ?evicted, "Evicted least recently used entry");
        }

        if self.persistence.is_enabled() {
            spawn_expiry_timer(
                self.store.clone(),
                self.persistence.clone(),
                self.on_expiry.clone(),
                self.shutdown_rx.clone(),
                key,
                ttl,
            );
            self.save_snapshot(&store).await;
        }
    }

    // == Get ==
    /// Retrieves the value for `key`.
    ///
    /// A live hit marks the key most recently used and returns its value.
    /// A miss (absent, or observed expired and removed) falls through to
    /// the async loader. The loaded value is returned but not inserted
    /// back; callers wanting that call put themselves.
    pub async fn get(&self, key: &K) -> Option<V> {
        {
            let mut store = self.store.write().await;
            if let Ok(value) = store.get(key) {
                return Some(value);
            }
        }

        self.load_async(key).await
    }

    // == Remove ==
    /// Deletes the entry for `key` unconditionally and snapshots.
    pub async fn remove(&self, key: &K) {
        let mut store = self.store.write().await;
        if store.remove(key) {
            debug!(key = ?key, "Entry removed");
        }
        self.save_snapshot(&store).await;
    }

    // == Clear ==
    /// Empties the cache and snapshots the empty state.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.clear();
        info!("Cache cleared");
        self.save_snapshot(&store).await;
    }

    // == Length ==
    /// Returns the number of stored entries, including ones whose TTL has
    /// elapsed but which no one has observed yet.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Shutdown ==
    /// Drains pending expiry timers: every armed timer exits at its next
    /// wakeup without firing. In-flight loads finish on their own (bounded
    /// by the load timeout).
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Cache shut down, pending expiry timers drained");
    }

    // == Async Load ==
    /// Runs the caller-supplied loader on a blocking worker and waits for
    /// it, bounded by the configured load timeout.
    ///
    /// Loader errors, panics and timeouts all surface as an absent result;
    /// the failure is logged and counted, never propagated.
    async fn load_async(&self, key: &K) -> Option<V> {
        let loader = self.loader.clone();
        let owned_key = key.clone();
        let task = tokio::task::spawn_blocking(move || loader(&owned_key));

        match tokio::time::timeout(self.load_timeout, task).await {
            Ok(Ok(Ok(value))) => {
                debug!(key = ?key, "Async load succeeded");
                Some(value)
            }
            Ok(Ok(Err(e))) => {
                warn!(key = ?key, error = %e, "Async load failed");
                self.note_load_failure().await;
                None
            }
            Ok(Err(e)) => {
                warn!(key = ?key, error = %e, "Async load worker died");
                self.note_load_failure().await;
                None
            }
            Err(_) => {
                warn!(key = ?key, timeout = ?self.load_timeout, "Async load timed out");
                self.note_load_failure().await;
                None
            }
        }
    }

    async fn note_load_failure(&self) {
        self.store.write().await.record_load_failure();
    }

    // == Snapshot ==
    /// Writes the current state while the caller holds the write guard.
    /// Persistence failures keep the cache running in memory.
    async fn save_snapshot(&self, store: &CacheStore<K, V>) {
        if let Err(e) = self
            .persistence
            .save(store.snapshot_entries(), store.recency_oldest_first())
            .await
        {
            warn!(error = %e, "Failed to write cache snapshot");
        }
    }
}
