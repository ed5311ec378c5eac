//! In-process cache backed by `moka`, for single-instance deployments.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use taskmanager_common::Task;

use crate::error::Result;
use crate::{CacheStats, TaskCache};

const MAX_ENTRIES: u64 = 10_000;

#[derive(Clone)]
struct Entry {
    tasks: Vec<Task>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MokaTaskCache {
    inner: Cache<String, Entry>,
    commands: AtomicU64,
}

impl MokaTaskCache {
    pub fn new() -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner, commands: AtomicU64::new(0) }
    }

    fn record_command(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MokaTaskCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskCache for MokaTaskCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Task>>> {
        self.record_command();
        Ok(self.inner.get(key).await.map(|entry| entry.tasks))
    }

    async fn put(&self, key: &str, tasks: &[Task], ttl: Duration) -> Result<()> {
        self.record_command();
        let entry = Entry { tasks: tasks.to_vec(), ttl: ttl.max(Duration::from_secs(1)) };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.record_command();
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.record_command();
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        self.inner.run_pending_tasks().await;
        Ok(CacheStats {
            total_commands: self.commands.load(Ordering::Relaxed),
            connected_clients: 0,
            entries: Some(self.inner.entry_count()),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
