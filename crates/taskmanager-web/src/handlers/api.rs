//! JSON task API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use taskmanager_common::{NewTask, Task, TaskId, TaskUpdate, DEFAULT_USER_ID};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
    pub from_cache: bool,
}

pub async fn list_tasks(State(state): State<SharedState>) -> Result<Json<TaskListResponse>> {
    let list = state.tasks.list(DEFAULT_USER_ID).await?;
    Ok(Json(TaskListResponse { count: list.tasks.len(), tasks: list.tasks, from_cache: list.from_cache }))
}

pub async fn create_task(
    State(state): State<SharedState>,
    ApiJson(new_task): ApiJson<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(DEFAULT_USER_ID, new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(State(state): State<SharedState>, ApiPath(id): ApiPath<TaskId>) -> Result<Json<Task>> {
    Ok(Json(state.tasks.get(DEFAULT_USER_ID, id).await?))
}

pub async fn update_task(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<TaskId>,
    ApiJson(update): ApiJson<TaskUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(state.tasks.update(DEFAULT_USER_ID, id, update).await?))
}

pub async fn delete_task(State(state): State<SharedState>, ApiPath(id): ApiPath<TaskId>) -> Result<StatusCode> {
    state.tasks.delete(DEFAULT_USER_ID, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
