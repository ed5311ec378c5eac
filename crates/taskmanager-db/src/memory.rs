//! Process-local task storage.
//!
//! Ids come from a counter that starts at 1 and is never rewound, so an id
//! is unique for the lifetime of the process even after deletes.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use taskmanager_common::{NewTask, Task, TaskId, TaskUpdate, UserId};

use crate::error::{Result, StoreError};
use crate::store::TaskStore;

#[derive(Debug)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    next_id: AtomicI64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks.iter().filter(|t| t.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id && t.user_id == user_id).cloned())
    }

    async fn create(&self, user_id: UserId, new_task: NewTask) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = Task::new(id, user_id, new_task, Utc::now());
        tasks.push(task.clone());
        Ok(task)
    }

    async fn toggle(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .map(|task| {
                task.toggle(Utc::now());
                task.clone()
            }))
    }

    async fn update(&self, user_id: UserId, id: TaskId, update: TaskUpdate) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id && t.user_id == user_id) else {
            return Ok(None);
        };
        task.apply(update, Utc::now())
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        Ok(Some(task.clone()))
    }

    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(tasks.len() < before)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.tasks.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }
}
