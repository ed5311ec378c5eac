//! The task entity and its write payloads.
//! Mirrors the `tasks` table; the in-memory store holds the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskManagerError};

pub type TaskId = i64;
pub type UserId = i64;

/// Owner id used until sessions exist.
pub const DEFAULT_USER_ID: UserId = 1;

/// Cache key holding the serialized task list of one user.
pub fn cache_key(user_id: UserId) -> String {
    format!("tasks:user:{user_id}")
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, user_id: UserId, new_task: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title: new_task.title,
            description: new_task.description,
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Set the completion flag, keeping `completed_at` in step with it.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed == self.completed {
            return;
        }
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.set_completed(!self.completed, now);
    }

    /// Apply a partial update. The title, when present, must be non-blank.
    pub fn apply(&mut self, update: TaskUpdate, now: DateTime<Utc>) -> Result<()> {
        let update = update.validated()?;
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            self.set_completed(completed, now);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), description: String::new() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Trim the title and reject blank ones.
    pub fn validated(self) -> Result<Self> {
        let title = validate_title(&self.title)?;
        Ok(Self { title, description: self.description.trim().to_string() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    pub fn validated(self) -> Result<Self> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        Ok(Self {
            title,
            description: self.description.map(|d| d.trim().to_string()),
            completed: self.completed,
        })
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskManagerError::Validation("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}
