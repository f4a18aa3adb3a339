use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::store::CacheStore;
use super::write_back::{WriteBackJob, WriteBackQueue};
use crate::error::Result;

/// Upper bound on a cache read before it is abandoned and counted as a miss.
pub const CACHE_READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Get-or-populate wrapper around a shared [`CacheStore`].
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    write_back: Arc<WriteBackQueue>,
    read_timeout: Duration,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>, write_back: Arc<WriteBackQueue>) -> Self {
        Self {
            store,
            write_back,
            read_timeout: CACHE_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn write_back(&self) -> &Arc<WriteBackQueue> {
        &self.write_back
    }

    /// Returns the cached value for `key`, or runs `fetch` and schedules the
    /// result to be cached for `ttl`.
    ///
    /// Only `fetch` errors are returned. Cache read failures, timeouts and
    /// undecodable entries all count as misses; the write-back is queued and
    /// never awaited. A failed fetch caches nothing.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.read(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;

        match serde_json::to_string(&value) {
            Ok(serialized) => {
                self.write_back.enqueue(WriteBackJob::Set {
                    key: key.to_string(),
                    value: serialized,
                    ttl,
                });
            }
            Err(e) => tracing::warn!("Not caching {}: serialization failed: {}", key, e),
        }

        Ok(value)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match tokio::time::timeout(self.read_timeout, self.store.get(key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                tracing::debug!("Cache miss: {}", key);
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                return None;
            }
            Err(_) => {
                tracing::warn!("Cache read timed out for {}, treating as miss", key);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }
}
