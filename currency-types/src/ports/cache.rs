//! Cache port.

use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::CacheError;

/// Key/value store with per-entry expiry.
///
/// `get` on an absent or expired key returns `Ok(None)`. `set` overwrites
/// unconditionally and restarts the TTL clock. Errors are only raised by
/// backends reached over the network; callers treat them as a miss.
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

/// Typed JSON access on top of any [`Cache`].
#[async_trait::async_trait]
pub trait CacheExt: Cache {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, bytes, ttl).await
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}
