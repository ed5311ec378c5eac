//! Server-rendered task list and its form/link actions.
//!
//! Every action redirects back to `/`. Actions on ids that do not exist are
//! ignored, so a stale link or a double click is harmless. A non-numeric id
//! is a 404.

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use minijinja::context;
use serde::Deserialize;

use taskmanager_common::{NewTask, TaskId, DEFAULT_USER_ID};

use crate::error::{AppError, PageError};
use crate::extract::PagePath;
use crate::state::SharedState;

pub async fn index(State(state): State<SharedState>) -> Result<Html<String>, PageError> {
    let list = state.tasks.list(DEFAULT_USER_ID).await?;
    let cache_backend = state.tasks.cache().map(|c| c.backend()).unwrap_or("none");

    let html = state
        .templates
        .render_index(context! {
            tasks => list.tasks,
            from_cache => list.from_cache,
            version => &state.info.version,
            environment => &state.info.environment,
            instance_id => &state.info.instance.id,
            instance_name => &state.info.instance.name,
            cache_backend => cache_backend,
        })
        .map_err(|e| AppError::Internal(format!("template error: {e}")))?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub async fn add_task(
    State(state): State<SharedState>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, PageError> {
    let new_task = NewTask::new(form.title).with_description(form.description);
    match state.tasks.create(DEFAULT_USER_ID, new_task).await {
        Ok(_) | Err(AppError::Validation(_)) => Ok(Redirect::to("/")),
        Err(e) => Err(e.into()),
    }
}

pub async fn complete_task(
    State(state): State<SharedState>,
    PagePath(id): PagePath<TaskId>,
) -> Result<Redirect, PageError> {
    ignore_missing(state.tasks.toggle(DEFAULT_USER_ID, id).await.map(|_| ()))
}

pub async fn delete_task(
    State(state): State<SharedState>,
    PagePath(id): PagePath<TaskId>,
) -> Result<Redirect, PageError> {
    ignore_missing(state.tasks.delete(DEFAULT_USER_ID, id).await)
}

fn ignore_missing(result: crate::error::Result<()>) -> Result<Redirect, PageError> {
    match result {
        Ok(()) | Err(AppError::NotFound(_)) => Ok(Redirect::to("/")),
        Err(e) => Err(e.into()),
    }
}
