//! Read-through cache for task lists.
//!
//! A whole user's list is cached under one key (`tasks:user:{id}`) as JSON and
//! dropped on every write. There is no eviction policy beyond the entry TTL.

pub mod error;
pub mod memory;
pub mod redis_cache;

pub use error::{CacheError, Result};
pub use memory::MokaTaskCache;
pub use redis_cache::RedisTaskCache;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use taskmanager_common::Task;

/// Server-side counters reported by the health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_commands: u64,
    pub connected_clients: u64,
    pub entries: Option<u64>,
}

#[async_trait]
pub trait TaskCache: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<Task>>>;

    async fn put(&self, key: &str, tasks: &[Task], ttl: Duration) -> Result<()>;

    async fn invalidate(&self, key: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    async fn stats(&self) -> Result<CacheStats>;

    fn backend(&self) -> &'static str;
}

pub(crate) fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string(tasks)?)
}

pub(crate) fn decode(json: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(json)?)
}
