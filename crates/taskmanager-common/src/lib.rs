//! taskmanager-common — Shared task types and errors used across all TaskManager crates.

pub mod error;
pub mod task;

// Re-export commonly used types
pub use error::{Result, TaskManagerError};
pub use task::{cache_key, NewTask, Task, TaskId, TaskUpdate, UserId, DEFAULT_USER_ID};
