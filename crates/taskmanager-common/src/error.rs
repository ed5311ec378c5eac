use thiserror::Error;

/// Errors raised while building or changing a task.
#[derive(Debug, Error)]
pub enum TaskManagerError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, TaskManagerError>;
