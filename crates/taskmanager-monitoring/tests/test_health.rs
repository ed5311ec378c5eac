use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use taskmanager_cache::{CacheError, CacheStats, MokaTaskCache, TaskCache};
use taskmanager_common::{NewTask, Task, TaskId, TaskUpdate, UserId, DEFAULT_USER_ID};
use taskmanager_db::{InMemoryTaskStore, StoreError, TaskStore};
use taskmanager_monitoring::{CheckStatus, HealthChecker, InstanceInfo};

/// A cache whose server has gone away.
struct DownCache;

#[async_trait]
impl TaskCache for DownCache {
    async fn get(&self, _key: &str) -> taskmanager_cache::Result<Option<Vec<Task>>> {
        Err(CacheError::Pool("connection refused".to_string()))
    }
    async fn put(&self, _key: &str, _tasks: &[Task], _ttl: Duration) -> taskmanager_cache::Result<()> {
        Err(CacheError::Pool("connection refused".to_string()))
    }
    async fn invalidate(&self, _key: &str) -> taskmanager_cache::Result<()> {
        Err(CacheError::Pool("connection refused".to_string()))
    }
    async fn ping(&self) -> taskmanager_cache::Result<()> {
        Err(CacheError::Pool("connection refused".to_string()))
    }
    async fn stats(&self) -> taskmanager_cache::Result<CacheStats> {
        Err(CacheError::Pool("connection refused".to_string()))
    }
    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// A store whose database has gone away.
struct DownStore;

#[async_trait]
impl TaskStore for DownStore {
    async fn list(&self, _user_id: UserId) -> taskmanager_db::Result<Vec<Task>> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn get(&self, _user_id: UserId, _id: TaskId) -> taskmanager_db::Result<Option<Task>> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn create(&self, _user_id: UserId, _new_task: NewTask) -> taskmanager_db::Result<Task> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn toggle(&self, _user_id: UserId, _id: TaskId) -> taskmanager_db::Result<Option<Task>> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn update(&self, _user_id: UserId, _id: TaskId, _update: TaskUpdate) -> taskmanager_db::Result<Option<Task>> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn delete(&self, _user_id: UserId, _id: TaskId) -> taskmanager_db::Result<bool> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn count(&self) -> taskmanager_db::Result<u64> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    async fn ping(&self) -> taskmanager_db::Result<()> {
        Err(StoreError::Invalid("database unavailable".to_string()))
    }
    fn backend(&self) -> &'static str {
        "postgres"
    }
}

fn checker(store: Arc<dyn TaskStore>, cache: Option<Arc<dyn TaskCache>>) -> HealthChecker {
    HealthChecker::new(store, cache, InstanceInfo::new("app-1", "Instance 1"), "1.2.3", "production")
}

#[tokio::test]
async fn test_in_memory_without_cache_is_healthy() {
    let store = Arc::new(InMemoryTaskStore::new());
    store.create(DEFAULT_USER_ID, NewTask::new("one")).await.unwrap();

    let report = checker(store, None).report().await;
    assert!(report.is_healthy());
    assert_eq!(report.checks.database.tasks_count, Some(1));
    assert_eq!(report.checks.database.backend, "in_memory");
    assert_eq!(report.checks.redis.status, CheckStatus::NotConfigured);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], "1.2.3");
    assert_eq!(json["environment"], "production");
    assert_eq!(json["instance"]["id"], "app-1");
    assert_eq!(json["checks"]["redis"]["status"], "not_configured");
    assert!(json["metrics"]["total_response_time_ms"].is_number());
    assert!(json.get("unhealthy_services").is_none());
}

#[tokio::test]
async fn test_memory_cache_reports_stats() {
    let report = checker(Arc::new(InMemoryTaskStore::new()), Some(Arc::new(MokaTaskCache::new())))
        .report()
        .await;
    assert_eq!(report.checks.redis.status, CheckStatus::Healthy);
    assert_eq!(report.checks.redis.backend, Some("memory"));
    assert_eq!(report.checks.redis.entries, Some(0));
}

#[tokio::test]
async fn test_cache_down_makes_report_unhealthy() {
    let report = checker(Arc::new(InMemoryTaskStore::new()), Some(Arc::new(DownCache))).report().await;
    assert!(!report.is_healthy());
    assert_eq!(report.unhealthy_services, vec!["redis"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["redis"]["error"], "Redis pool error: connection refused");
}

#[tokio::test]
async fn test_database_down_makes_report_unhealthy() {
    let report = checker(Arc::new(DownStore), None).report().await;
    assert_eq!(report.unhealthy_services, vec!["database"]);
    assert!(report.checks.database.tasks_count.is_none());
    assert!(report.checks.database.error.is_some());
}

#[tokio::test]
async fn test_unknown_disk_path_is_not_unhealthy() {
    let report = checker(Arc::new(InMemoryTaskStore::new()), None)
        .with_disk_path("relative/path")
        .report()
        .await;
    assert_eq!(report.checks.disk.status, CheckStatus::Error);
    assert!(report.is_healthy());
}

#[tokio::test]
async fn test_readiness() {
    let ready = checker(Arc::new(InMemoryTaskStore::new()), None).readiness().await;
    assert!(ready.is_ready());
    assert_eq!(ready.instance.as_deref(), Some("app-1"));

    let not_ready = checker(Arc::new(InMemoryTaskStore::new()), Some(Arc::new(DownCache))).readiness().await;
    assert!(!not_ready.is_ready());
    assert_eq!(not_ready.status, "not_ready");
}

#[tokio::test]
async fn test_liveness_always_alive() {
    let live = checker(Arc::new(DownStore), None).liveness();
    assert_eq!(live.status, "alive");
    assert_eq!(live.instance, "app-1");
}
