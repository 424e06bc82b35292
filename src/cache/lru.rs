//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Recency reordering is a compound read-modify-write, so the tracker
/// requires serialized access; the owning store holds one exclusive
/// scope across touch/remove/eviction for each logical operation.
#[derive(Debug)]
pub struct LruTracker<K> {
    /// Order of keys by access time
    order: VecDeque<K>,
}

impl<K: Eq + Clone> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    /// Rebuilds a tracker from a persisted recency order, oldest key first.
    pub fn restore_oldest_first(keys: Vec<K>) -> Self {
        let mut tracker = Self::new();
        for key in keys {
            tracker.order.push_front(key);
        }
        tracker
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    ///
    /// If key exists, removes it first then adds to front.
    /// If key is new, just adds to front.
    pub fn touch(&mut self, key: &K) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    /// Removes a key from the tracker without affecting the order of the rest.
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty. Ties between untouched keys are
    /// broken by insertion order: the oldest insertion wins.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_back()
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.back()
    }

    // == Clear ==
    /// Empties the tracker.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Snapshot ==
    /// Returns all tracked keys, oldest first, for persistence.
    pub fn keys_oldest_first(&self) -> Vec<K> {
        self.order.iter().rev().cloned().collect()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

impl<K: Eq + Clone> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn touch_str(lru: &mut LruTracker<String>, key: &str) {
        lru.touch(&key.to_string());
    }

    #[test]
    fn test_lru_new() {
        let lru: LruTracker<String> = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_new_key() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");
        touch_str(&mut lru, "key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(lru.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");
        touch_str(&mut lru, "key3");

        // Touch key1 again - should move to front
        touch_str(&mut lru, "key1");

        assert_eq!(lru.len(), 3);
        // key2 is now oldest
        assert_eq!(lru.peek_oldest(), Some(&"key2".to_string()));
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");
        touch_str(&mut lru, "key3");

        let evicted = lru.evict_oldest();
        assert_eq!(evicted, Some("key1".to_string()));
        assert_eq!(lru.len(), 2);

        let evicted = lru.evict_oldest();
        assert_eq!(evicted, Some("key2".to_string()));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_evict_empty() {
        let mut lru: LruTracker<String> = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");
        touch_str(&mut lru, "key3");

        lru.remove(&"key2".to_string());

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains(&"key2".to_string()));
        assert!(lru.contains(&"key1".to_string()));
        assert!(lru.contains(&"key3".to_string()));
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "a");
        touch_str(&mut lru, "b");
        touch_str(&mut lru, "c");

        // Access in different order
        touch_str(&mut lru, "a");
        touch_str(&mut lru, "c");
        touch_str(&mut lru, "b");

        // touch(a): [a]
        // touch(b): [b, a]
        // touch(c): [c, b, a]
        // touch(a): remove a, add front: [a, c, b]
        // touch(c): remove c, add front: [c, a, b]
        // touch(b): remove b, add front: [b, c, a]
        // So back (oldest) = 'a'
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
    }

    #[test]
    fn test_lru_remove_nonexistent_key() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");

        // Remove a key that doesn't exist - should not panic or affect existing keys
        lru.remove(&"nonexistent".to_string());

        assert_eq!(lru.len(), 2);
        assert!(lru.contains(&"key1".to_string()));
        assert!(lru.contains(&"key2".to_string()));
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key1");

        // Should only have one entry
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some("key1".to_string()));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "key1");
        touch_str(&mut lru, "key2");

        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_snapshot_roundtrip() {
        let mut lru = LruTracker::new();

        touch_str(&mut lru, "a");
        touch_str(&mut lru, "b");
        touch_str(&mut lru, "c");
        touch_str(&mut lru, "a"); // order oldest-first is now: b, c, a

        let keys = lru.keys_oldest_first();
        assert_eq!(keys, vec!["b".to_string(), "c".to_string(), "a".to_string()]);

        let mut restored = LruTracker::restore_oldest_first(keys);
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.evict_oldest(), Some("b".to_string()));
        assert_eq!(restored.evict_oldest(), Some("c".to_string()));
        assert_eq!(restored.evict_oldest(), Some("a".to_string()));
    }
}
