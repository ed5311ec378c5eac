//! Cache-aside task operations shared by the HTML pages and the JSON API.
//!
//! Reads try the cache first and fall back to the store, repopulating the
//! cache on a miss. Every successful write drops the owner's cached list.
//! The cache is never allowed to fail a request: its errors are logged and
//! treated as a miss.

use std::sync::Arc;
use std::time::Duration;

use taskmanager_cache::TaskCache;
use taskmanager_common::{cache_key, NewTask, Task, TaskId, TaskUpdate, UserId};
use taskmanager_db::TaskStore;
use taskmanager_monitoring::set_tasks_total;

use crate::error::{AppError, Result};

/// A user's task list and where it came from.
#[derive(Debug, Clone)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub from_cache: bool,
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    cache: Option<Arc<dyn TaskCache>>,
    ttl: Duration,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, cache: Option<Arc<dyn TaskCache>>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub fn cache(&self) -> Option<&Arc<dyn TaskCache>> {
        self.cache.as_ref()
    }

    pub async fn list(&self, user_id: UserId) -> Result<TaskList> {
        let key = cache_key(user_id);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(tasks)) => {
                    tracing::debug!(user_id, count = tasks.len(), "tasks loaded from cache");
                    return Ok(TaskList { tasks, from_cache: true });
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, key, "cache read failed"),
            }
        }

        let tasks = self.store.list(user_id).await?;

        if let Some(cache) = &self.cache {
            match cache.put(&key, &tasks, self.ttl).await {
                Ok(()) => tracing::debug!(user_id, ttl_secs = self.ttl.as_secs(), "tasks saved to cache"),
                Err(e) => tracing::warn!(error = %e, key, "cache save failed"),
            }
        }

        self.refresh_tasks_total().await;
        Ok(TaskList { tasks, from_cache: false })
    }

    pub async fn get(&self, user_id: UserId, id: TaskId) -> Result<Task> {
        self.store.get(user_id, id).await?.ok_or(AppError::NotFound(id))
    }

    pub async fn create(&self, user_id: UserId, new_task: NewTask) -> Result<Task> {
        let new_task = new_task.validated()?;
        let task = self.store.create(user_id, new_task).await?;
        tracing::info!(task_id = task.id, user_id, "task created");
        self.after_write(user_id).await;
        Ok(task)
    }

    pub async fn toggle(&self, user_id: UserId, id: TaskId) -> Result<Task> {
        let task = self.store.toggle(user_id, id).await?.ok_or(AppError::NotFound(id))?;
        tracing::info!(task_id = id, completed = task.completed, "task toggled");
        self.after_write(user_id).await;
        Ok(task)
    }

    pub async fn update(&self, user_id: UserId, id: TaskId, update: TaskUpdate) -> Result<Task> {
        if update.is_empty() {
            return self.get(user_id, id).await;
        }
        let update = update.validated()?;
        let task = self.store.update(user_id, id, update).await?.ok_or(AppError::NotFound(id))?;
        tracing::info!(task_id = id, "task updated");
        self.after_write(user_id).await;
        Ok(task)
    }

    pub async fn delete(&self, user_id: UserId, id: TaskId) -> Result<()> {
        if !self.store.delete(user_id, id).await? {
            return Err(AppError::NotFound(id));
        }
        tracing::info!(task_id = id, "task deleted");
        self.after_write(user_id).await;
        Ok(())
    }

    async fn after_write(&self, user_id: UserId) {
        if let Some(cache) = &self.cache {
            let key = cache_key(user_id);
            match cache.invalidate(&key).await {
                Ok(()) => tracing::debug!(key, "cache invalidated"),
                Err(e) => tracing::warn!(error = %e, key, "cache invalidation failed"),
            }
        }
        self.refresh_tasks_total().await;
    }

    async fn refresh_tasks_total(&self) {
        match self.store.count().await {
            Ok(count) => set_tasks_total(count),
            Err(e) => tracing::warn!(error = %e, "could not count tasks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use taskmanager_cache::MokaTaskCache;
    use taskmanager_common::DEFAULT_USER_ID;
    use taskmanager_db::InMemoryTaskStore;

    /// Counts every call that reaches the store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryTaskStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TaskStore for CountingStore {
        async fn list(&self, user_id: UserId) -> taskmanager_db::Result<Vec<Task>> {
            self.hit();
            self.inner.list(user_id).await
        }
        async fn get(&self, user_id: UserId, id: TaskId) -> taskmanager_db::Result<Option<Task>> {
            self.hit();
            self.inner.get(user_id, id).await
        }
        async fn create(&self, user_id: UserId, new_task: NewTask) -> taskmanager_db::Result<Task> {
            self.hit();
            self.inner.create(user_id, new_task).await
        }
        async fn toggle(&self, user_id: UserId, id: TaskId) -> taskmanager_db::Result<Option<Task>> {
            self.hit();
            self.inner.toggle(user_id, id).await
        }
        async fn update(&self, user_id: UserId, id: TaskId, update: TaskUpdate) -> taskmanager_db::Result<Option<Task>> {
            self.hit();
            self.inner.update(user_id, id, update).await
        }
        async fn delete(&self, user_id: UserId, id: TaskId) -> taskmanager_db::Result<bool> {
            self.hit();
            self.inner.delete(user_id, id).await
        }
        async fn count(&self) -> taskmanager_db::Result<u64> {
            self.hit();
            self.inner.count().await
        }
        async fn ping(&self) -> taskmanager_db::Result<()> {
            self.inner.ping().await
        }
        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    fn service() -> TaskService {
        TaskService::new(
            Arc::new(InMemoryTaskStore::new()),
            Some(Arc::new(MokaTaskCache::new())),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn test_second_list_is_served_from_cache() {
        let service = service();
        service.create(DEFAULT_USER_ID, NewTask::new("a")).await.unwrap();

        assert!(!service.list(DEFAULT_USER_ID).await.unwrap().from_cache);
        let cached = service.list(DEFAULT_USER_ID).await.unwrap();
        assert!(cached.from_cache);
        assert_eq!(cached.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_touch_store() {
        let store = Arc::new(CountingStore::default());
        let service = TaskService::new(store.clone(), Some(Arc::new(MokaTaskCache::new())), Duration::from_secs(300));
        service.create(DEFAULT_USER_ID, NewTask::new("a")).await.unwrap();
        assert!(!service.list(DEFAULT_USER_ID).await.unwrap().from_cache);

        let before = store.calls();
        let cached = service.list(DEFAULT_USER_ID).await.unwrap();
        assert!(cached.from_cache);
        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_writes_invalidate_cache() {
        let service = service();
        let task = service.create(DEFAULT_USER_ID, NewTask::new("a")).await.unwrap();
        service.list(DEFAULT_USER_ID).await.unwrap();

        service.toggle(DEFAULT_USER_ID, task.id).await.unwrap();
        let list = service.list(DEFAULT_USER_ID).await.unwrap();
        assert!(!list.from_cache);
        assert!(list.tasks[0].completed);

        service.delete(DEFAULT_USER_ID, task.id).await.unwrap();
        let list = service.list(DEFAULT_USER_ID).await.unwrap();
        assert!(!list.from_cache);
        assert!(list.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_without_cache_always_reads_store() {
        let service = TaskService::new(Arc::new(InMemoryTaskStore::new()), None, Duration::from_secs(300));
        service.list(DEFAULT_USER_ID).await.unwrap();
        assert!(!service.list(DEFAULT_USER_ID).await.unwrap().from_cache);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let err = service().create(DEFAULT_USER_ID, NewTask::new("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let service = service();
        assert!(matches!(service.toggle(DEFAULT_USER_ID, 99).await, Err(AppError::NotFound(99))));
        assert!(matches!(service.delete(DEFAULT_USER_ID, 99).await, Err(AppError::NotFound(99))));
        assert!(matches!(service.get(DEFAULT_USER_ID, 99).await, Err(AppError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_empty_update_returns_task_unchanged() {
        let service = service();
        let task = service.create(DEFAULT_USER_ID, NewTask::new("same")).await.unwrap();
        let unchanged = service.update(DEFAULT_USER_ID, task.id, TaskUpdate::default()).await.unwrap();
        assert_eq!(unchanged, task);
    }
}
