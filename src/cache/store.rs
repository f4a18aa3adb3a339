use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::error::Result;

/// Operations consumed from the key-value cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Adds `by` to `member`'s score in the sorted set `set`.
    async fn incr_sorted(&self, set: &str, member: &str, by: f64) -> Result<()>;

    /// Highest-scored members of `set`, best first.
    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<String>>;
}

/// Every this many writes, `MemoryStore` drops all expired entries.
pub const SWEEP_EVERY_WRITES: usize = 128;

/// In-process store with TTL expiry.
///
/// Expired entries are dropped when read and by a sweep that runs every
/// [`SWEEP_EVERY_WRITES`] writes, so keys that are never read again do not
/// accumulate. Used when no Redis is configured and as the test double for
/// the cache.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, (String, Instant)>,
    sorted_sets: DashMap<String, HashMap<String, f64>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.value().1 > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries held, expired ones included.
    pub fn stored(&self) -> usize {
        self.entries.len()
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, (_, expires)| *expires > now);
        let swept = before.saturating_sub(self.entries.len());
        if swept > 0 {
            tracing::debug!("Swept {} expired cache entries", swept);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.value().1 > now {
                return Ok(Some(entry.value().0.clone()));
            }
        } else {
            return Ok(None);
        }

        // Expired: drop it now that the read guard is released.
        self.entries.remove_if(key, |_, (_, expires)| *expires <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_EVERY_WRITES == 0 {
            self.sweep_expired();
        }
        Ok(())
    }

    async fn incr_sorted(&self, set: &str, member: &str, by: f64) -> Result<()> {
        *self
            .sorted_sets
            .entry(set.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0.0) += by;
        Ok(())
    }

    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<String>> {
        let Some(members) = self.sorted_sets.get(set) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(&String, &f64)> = members.iter().collect();
        // Ties are broken by member, descending, matching ZREVRANGE.
        ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| b.0.cmp(a.0)));

        Ok(ranked
            .into_iter()
            .take(n)
            .map(|(member, _)| member.clone())
            .collect())
    }
}
