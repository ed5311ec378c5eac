//! The storage trait shared by every backend.

use async_trait::async_trait;
use taskmanager_common::{NewTask, Task, TaskId, TaskUpdate, UserId};

use crate::error::Result;

/// Primary task storage.
///
/// Payloads arrive already validated; implementations only persist them.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks of a user, newest first.
    async fn list(&self, user_id: UserId) -> Result<Vec<Task>>;

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>>;

    async fn create(&self, user_id: UserId, new_task: NewTask) -> Result<Task>;

    /// Flip the completion flag. `None` when the task does not exist.
    async fn toggle(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>>;

    async fn update(&self, user_id: UserId, id: TaskId, update: TaskUpdate) -> Result<Option<Task>>;

    /// Returns whether a row was removed.
    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool>;

    /// Number of tasks across all users.
    async fn count(&self) -> Result<u64>;

    /// Cheap round trip used by readiness and health checks.
    async fn ping(&self) -> Result<()>;

    fn backend(&self) -> &'static str;
}
