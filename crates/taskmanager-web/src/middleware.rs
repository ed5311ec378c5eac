//! Per-request Prometheus instrumentation.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

use taskmanager_monitoring::record_request;

/// Label used for requests that matched no route, so 404 probing cannot
/// grow the label set.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let response = next.run(request).await;
    record_request(&method, &endpoint, start.elapsed());
    response
}
