//! Cache Module
//!
//! Provides in-process caching with TTL expiration, LRU eviction and async
//! load-on-miss.

mod entry;
mod lru;
mod micro;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use micro::{ExpiryCallback, LoaderFn, MicroCache};
pub use stats::CacheStats;
pub use store::CacheStore;
