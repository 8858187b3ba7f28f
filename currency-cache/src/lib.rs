//! # Currency Cache
//!
//! Concrete cache implementations (adapters) for the currency conversion service.
//! This crate provides the backends that implement the `Cache` port:
//! - `memory` - process-local map with lazy TTL expiry
//! - `redis_cache` - shared backend reached over the network (feature `redis`)

use std::sync::Arc;

use currency_types::Cache;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_cache;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

/// Build a cache backend from an optional connection URL.
///
/// - `None` selects the in-process [`MemoryCache`]
/// - `redis://...` / `rediss://...` selects [`RedisCache`] (requires the `redis` feature)
///
/// # Examples
///
/// ```ignore
/// let local = build_cache(None).await?;
/// let shared = build_cache(Some("redis://localhost:6379")).await?;
/// ```
pub async fn build_cache(url: Option<&str>) -> anyhow::Result<Arc<dyn Cache>> {
    match url {
        None => {
            tracing::info!("Using in-memory rate cache");
            Ok(Arc::new(MemoryCache::new()))
        }
        Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => {
            build_redis(url).await
        }
        Some(url) => anyhow::bail!("Unsupported cache URL: {}", url),
    }
}

#[cfg(feature = "redis")]
async fn build_redis(url: &str) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!("Using Redis rate cache");
    Ok(Arc::new(RedisCache::connect(url).await?))
}

#[cfg(not(feature = "redis"))]
async fn build_redis(_url: &str) -> anyhow::Result<Arc<dyn Cache>> {
    anyhow::bail!("Redis cache requested but the `redis` feature is not enabled")
}
