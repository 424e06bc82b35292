//! Microcache demo
//!
//! Walks the cache through its lifecycle: put, hit, TTL expiry with loader
//! fallthrough, and a bulk-insert timing pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microcache::{CacheConfig, MicroCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting microcache demo");

    let config = CacheConfig::from_env();
    info!(
        max_size = config.max_size,
        persistence_enabled = config.persistence_enabled,
        persistence_path = ?config.persistence_path,
        load_timeout = ?config.load_timeout,
        "Configuration loaded"
    );

    let cache: MicroCache<String, String> = MicroCache::with_config(
        config,
        Arc::new(|key: &String| info!(%key, "Entry expired")),
        Arc::new(|key: &String| Ok(format!("loaded:{key}"))),
    )
    .await?;

    cache
        .put("test".to_string(), "Hello World".to_string(), Duration::from_secs(3))
        .await;
    info!(value = ?cache.get(&"test".to_string()).await, "Value");

    tokio::time::sleep(Duration::from_secs(4)).await;
    // The entry is gone; the loader answers instead
    info!(value = ?cache.get(&"test".to_string()).await, "Value after expiration");
    info!(size = cache.len().await, "Cache size");

    let start = Instant::now();
    for i in 0..100_000u32 {
        cache
            .put(format!("key{i}"), format!("value{i}"), Duration::from_secs(5))
            .await;
    }
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        size = cache.len().await,
        "Inserted 100,000 entries"
    );

    let stats = cache.stats().await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        hit_rate = stats.hit_rate(),
        "Final statistics"
    );

    cache.shutdown();
    Ok(())
}
