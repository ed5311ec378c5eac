//! PostgreSQL task storage.
//!
//! Every write is a single auto-committed statement with `RETURNING`, so the
//! caller always gets the row as the database stored it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use taskmanager_common::{NewTask, Task, TaskId, TaskUpdate, UserId};

use crate::error::{Result, StoreError};
use crate::retry::{retry, RetryPolicy};
use crate::schema::{MIGRATIONS, TASK_COLUMNS};
use crate::store::TaskStore;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    completed: bool,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

/// `sqlx`-backed task store.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Open a pool, retrying per `policy` while the database is unreachable.
    pub async fn connect(url: &str, max_connections: u32, policy: RetryPolicy) -> Result<Self> {
        let pool = retry(policy, "database connection", || {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(url)
        })
        .await
        .map_err(|(attempts, source)| StoreError::Connect { attempts, source })?;

        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool { &self.pool }

    /// Create the schema if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("tasks schema ready");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn create(&self, user_id: UserId, new_task: NewTask) -> Result<Task> {
        let row: TaskRow = sqlx::query_as(&format!(
            "INSERT INTO tasks (user_id, title, description, completed) \
             VALUES ($1, $2, $3, FALSE) RETURNING {TASK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn toggle(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>> {
        // SET expressions read the pre-update row.
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET completed = NOT completed, \
                 completed_at = CASE WHEN completed THEN NULL ELSE NOW() END \
             WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn update(&self, user_id: UserId, id: TaskId, update: TaskUpdate) -> Result<Option<Task>> {
        let update = update
            .validated()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET \
                 title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 completed = COALESCE($5, completed), \
                 completed_at = CASE \
                     WHEN $5::BOOLEAN IS NULL OR $5 = completed THEN completed_at \
                     WHEN $5 THEN NOW() \
                     ELSE NULL END \
             WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
