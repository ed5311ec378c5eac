//! Axum router: maps all URL paths to handlers.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    api::{create_task, delete_task as api_delete_task, get_task, list_tasks, update_task},
    health::{health, live, ready},
    metrics::metrics,
    pages::{add_task, complete_task, delete_task, index},
};
use crate::middleware::track_metrics;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",               get(index))
        .route("/add",            post(add_task))
        .route("/complete/{id}",  get(complete_task))
        .route("/delete/{id}",    get(delete_task))

        // Health checks and scraping
        .route("/health",  get(health))
        .route("/ready",   get(ready))
        .route("/live",    get(live))
        .route("/metrics", get(metrics))

        // API endpoints
        .route("/api/tasks",      get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", get(get_task).patch(update_task).delete(api_delete_task))

        // Middleware
        .layer(middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
