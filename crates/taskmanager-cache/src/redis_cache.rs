//! Redis cache over a `deadpool-redis` pool.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

use taskmanager_common::Task;

use crate::error::Result;
use crate::{decode, encode, CacheStats, TaskCache};

#[derive(Clone)]
pub struct RedisTaskCache {
    pool: Pool,
}

impl std::fmt::Debug for RedisTaskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTaskCache").field("status", &self.pool.status()).finish()
    }
}

impl RedisTaskCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool for `redis_url`. No connection is opened until first use.
    pub fn from_url(redis_url: &str) -> Result<Self> {
        let pool = Config::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }

    async fn info(&self, section: &str) -> Result<String> {
        let mut connection = self.pool.get().await?;
        let info: String = redis::cmd("INFO").arg(section).query_async(&mut *connection).await?;
        Ok(info)
    }
}

/// Pull a numeric field out of an `INFO` reply (`name:value` lines).
fn info_field(info: &str, name: &str) -> Option<u64> {
    info.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        (key == name).then(|| value.trim().parse().ok()).flatten()
    })
}

#[async_trait]
impl TaskCache for RedisTaskCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Task>>> {
        let mut connection = self.pool.get().await?;
        let data: Option<String> = connection.get(key).await?;
        data.as_deref().map(decode).transpose()
    }

    async fn put(&self, key: &str, tasks: &[Task], ttl: Duration) -> Result<()> {
        let json = encode(tasks)?;
        let mut connection = self.pool.get().await?;
        let _: () = connection.set_ex(key, json, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut connection = self.pool.get().await?;
        let _: () = connection.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut connection = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut *connection).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let stats = self.info("stats").await?;
        let clients = self.info("clients").await?;
        Ok(CacheStats {
            total_commands: info_field(&stats, "total_commands_processed").unwrap_or(0),
            connected_clients: info_field(&clients, "connected_clients").unwrap_or(0),
            entries: None,
        })
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_STATS: &str = "# Stats\r\ntotal_connections_received:12\r\ntotal_commands_processed:345\r\ninstantaneous_ops_per_sec:0\r\n";

    #[test]
    fn test_info_field() {
        assert_eq!(info_field(INFO_STATS, "total_commands_processed"), Some(345));
        assert_eq!(info_field(INFO_STATS, "total_connections_received"), Some(12));
    }

    #[test]
    fn test_info_field_missing_or_not_numeric() {
        assert_eq!(info_field(INFO_STATS, "connected_clients"), None);
        assert_eq!(info_field("# Server\r\nredis_mode:standalone\r\n", "redis_mode"), None);
    }

    #[test]
    fn test_from_url_rejects_bad_scheme() {
        assert!(RedisTaskCache::from_url("http://localhost:6379").is_err());
    }
}
