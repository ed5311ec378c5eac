//! Health, readiness and liveness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use taskmanager_monitoring::{HealthReport, Liveness, Readiness};

use crate::state::SharedState;

pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.report().await;
    let status = if report.is_healthy() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(report))
}

pub async fn ready(State(state): State<SharedState>) -> (StatusCode, Json<Readiness>) {
    let readiness = state.health.readiness().await;
    let status = if readiness.is_ready() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(readiness))
}

pub async fn live(State(state): State<SharedState>) -> Json<Liveness> {
    Json(state.health.liveness())
}
