//! TTL Expiry Timers
//!
//! One-shot background tasks, armed one per put, that remove an entry once
//! its TTL elapses and notify the caller-supplied expiry callback.

use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheStore, ExpiryCallback};
use crate::persist::Persistence;

/// Spawns a one-shot timer that fires after `ttl` and removes the entry for
/// `key` if it is still expired at fire time.
///
/// The timer never trusts its own TTL: the entry may have been replaced by a
/// newer put or removed early, so it re-checks staleness against the store
/// before doing any work. Several timers may be outstanding for one key (one
/// per put); only the one that observes an expired entry removes it, invokes
/// the expiry callback and snapshots. A panicking callback is caught and
/// logged, never taking the scheduler down with it.
///
/// The removal, the callback and the snapshot write all happen under the
/// store's write lock, the same exclusive scope every other mutation uses.
///
/// Timers watch the cache's shutdown channel and exit without firing once it
/// trips, which is how teardown drains pending timers.
pub(crate) fn spawn_expiry_timer<K, V>(
    cache: Arc<RwLock<CacheStore<K, V>>>,
    persistence: Arc<Persistence>,
    on_expiry: ExpiryCallback<K>,
    mut shutdown: watch::Receiver<bool>,
    key: K,
    ttl: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Debug + Serialize + Send + Sync + 'static,
    V: Clone + Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(ttl) => {}
            _ = shutdown.changed() => {
                debug!(key = ?key, "Expiry timer cancelled by shutdown");
                return;
            }
        }

        let mut store = cache.write().await;
        if !store.remove_if_expired(&key) {
            // Entry was replaced or removed before the timer fired
            return;
        }
        debug!(key = ?key, "Entry expired and removed");

        if catch_unwind(AssertUnwindSafe(|| on_expiry(&key))).is_err() {
            warn!(key = ?key, "Expiry callback panicked");
        }

        if persistence.is_enabled() {
            if let Err(e) = persistence
                .save(store.snapshot_entries(), store.recency_oldest_first())
                .await
            {
                warn!(error = %e, "Failed to write snapshot after expiry");
            }
        }
    })
}
