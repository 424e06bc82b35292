//! Cache Store Module
//!
//! The unified cache engine: HashMap storage, LRU tracking and TTL state in
//! one structure so that map and tracker membership can never diverge. The
//! caller wraps the store in a single lock; every mutation here updates both
//! structures within one call.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with the specified capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_size,
        }
    }

    /// Rebuilds a store from persisted entries and recency order.
    ///
    /// Entries beyond `max_size` (a snapshot written by a larger instance)
    /// are dropped oldest-first so the capacity bound holds from the start.
    pub fn restore(
        max_size: usize,
        entries: Vec<(K, CacheEntry<V>)>,
        recency_oldest_first: Vec<K>,
    ) -> Self {
        let mut store = Self {
            entries: entries.into_iter().collect(),
            lru: LruTracker::restore_oldest_first(recency_oldest_first),
            stats: CacheStats::new(),
            max_size,
        };

        while store.entries.len() > store.max_size {
            match store.lru.evict_oldest() {
                Some(key) => {
                    store.entries.remove(&key);
                }
                None => break,
            }
        }

        store.stats.set_total_entries(store.entries.len());
        store
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`, expiring `ttl` from now.
    ///
    /// If inserting a new key at capacity, the least recently used entry is
    /// removed from both the map and the tracker in this same call, and its
    /// key is returned so the caller can act on the eviction.
    pub fn put(&mut self, key: K, value: V, ttl: Duration) -> Option<K> {
        let is_overwrite = self.entries.contains_key(&key);

        let mut evicted = None;
        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                evicted = Some(evicted_key);
            }
        }

        let entry = CacheEntry::new(value, ttl);
        self.entries.insert(key.clone(), entry);

        // Update LRU tracker (touch moves to front)
        self.lru.touch(&key);

        self.stats.set_total_entries(self.entries.len());

        evicted
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and live, and marks the key most recently
    /// used. An entry observed expired here is removed from both structures
    /// and reported as `Expired`; the caller decides what a miss means.
    pub fn get(&mut self, key: &K) -> Result<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                return Err(CacheError::Expired(format!("{key:?}")));
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            self.lru.touch(key);
            Ok(value)
        } else {
            self.stats.record_miss();
            Err(CacheError::NotFound(format!("{key:?}")))
        }
    }

    // == Remove ==
    /// Removes an entry unconditionally from both structures.
    ///
    /// Returns true if the key was present.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }

    // == Remove If Expired ==
    /// The expiry timer's fire-time staleness re-check.
    ///
    /// Removes the entry only if the key still holds one whose expiry time
    /// has passed. A replaced or already-removed entry makes this a no-op,
    /// so stale timers for the same key do no work.
    pub fn remove_if_expired(&mut self, key: &K) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_expiration();
                self.stats.set_total_entries(self.entries.len());
                true
            }
            _ => false,
        }
    }

    // == Clear ==
    /// Empties the store and the tracker.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Counts a swallowed loader failure.
    pub fn record_load_failure(&mut self) {
        self.stats.record_load_failure();
    }

    // == Snapshot Accessors ==
    /// Clones the full entry set for a snapshot.
    pub fn snapshot_entries(&self) -> Vec<(K, CacheEntry<V>)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect()
    }

    /// Clones the recency order, oldest first, for a snapshot.
    pub fn recency_oldest_first(&self) -> Vec<K> {
        self.lru.keys_oldest_first()
    }

    // == Length ==
    /// Returns the current number of entries, including ones whose TTL has
    /// elapsed but which no one has observed yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
