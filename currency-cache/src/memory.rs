//! In-process cache with per-entry TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use currency_types::{Cache, CacheError};
use dashmap::DashMap;
use tracing::debug;

/// Cached value with its absolute expiry.
///
/// `expires_at` is `None` when the TTL reaches past what `Instant` can
/// represent; such entries never expire.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// Thread-safe in-memory cache.
///
/// Expiry is lazy: an expired entry is dropped when it is next read.
/// There is no capacity bound; [`MemoryCache::purge_expired`] can be called
/// periodically to reclaim memory.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                debug!(key, "Cache hit");
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            // Only drop it if no concurrent writer refreshed the key meanwhile.
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
            debug!(key, "Cache entry expired");
            return Ok(None);
        }

        debug!(key, "Cache miss");
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }
}
