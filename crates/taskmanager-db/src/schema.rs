//! SQL schema for the `tasks` table.

/// Statements run by [`crate::PgTaskStore::migrate`], in order.
pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id           BIGSERIAL PRIMARY KEY,
        user_id      BIGINT      NOT NULL DEFAULT 1,
        title        TEXT        NOT NULL,
        description  TEXT        NOT NULL DEFAULT '',
        completed    BOOLEAN     NOT NULL DEFAULT FALSE,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        completed_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_user_created ON tasks (user_id, created_at DESC)",
];

pub(crate) const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, created_at, completed_at";
