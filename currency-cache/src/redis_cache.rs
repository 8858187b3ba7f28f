//! Redis-backed shared cache.
//!
//! Values are stored as raw bytes with an absolute expiry (`SET key value PX ttl`).

use std::time::Duration;

use async_trait::async_trait;
use currency_types::{Cache, CacheError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Cache adapter over a Redis connection manager.
///
/// The manager reconnects on its own; a failed round-trip surfaces as
/// [`CacheError::Backend`] and the caller falls back to the upstream.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to the given `redis://` URL.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = ConnectionManager::new(client).await.map_err(backend)?;
        Ok(Self { conn })
    }
}

fn backend(err: redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(backend)?;
        debug!(key, hit = value.is_some(), "Redis cache lookup");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        // PX rejects 0, so round sub-millisecond TTLs up.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut conn = self.conn.clone();
        let _: () = conn.pset_ex(key, value, millis).await.map_err(backend)?;
        Ok(())
    }
}
