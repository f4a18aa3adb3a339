use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use super::store::CacheStore;
use crate::error::{GatewayError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed cache.
///
/// `ConnectionManager` is a cheaply cloneable multiplexed connection that
/// reconnects on its own, so one instance is shared by every request task.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| GatewayError::Cache("timed out connecting to redis".to_string()))??;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // EX must be at least one second.
        let seconds = ttl.as_secs().max(1);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn incr_sorted(&self, set: &str, member: &str, by: f64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: f64 = redis::cmd("ZINCRBY")
            .arg(set)
            .arg(by)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn top_n(&self, set: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("ZREVRANGE")
            .arg(set)
            .arg(0)
            .arg(n as i64 - 1)
            .query_async(&mut conn)
            .await?;
        Ok(members)
    }
}
