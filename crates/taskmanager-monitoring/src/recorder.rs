//! Process-wide Prometheus recorder and the three metric families the app exports.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{MonitoringError, Result};

pub use metrics_exporter_prometheus::PrometheusHandle;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const TASKS_TOTAL: &str = "tasks_total";

/// How often buffered histogram samples are folded into their buckets.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Prometheus client default buckets.
const DURATION_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

static HANDLE: OnceLock<std::result::Result<PrometheusHandle, String>> = OnceLock::new();

/// Install the global recorder on first call; later calls return the same handle.
pub fn install_recorder() -> Result<PrometheusHandle> {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), &DURATION_BUCKETS)
                .and_then(PrometheusBuilder::install_recorder)
                .map_err(|e| e.to_string())?;

            describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
            describe_histogram!(REQUEST_DURATION, Unit::Seconds, "HTTP request latency");
            describe_gauge!(TASKS_TOTAL, "Total number of tasks");
            tracing::debug!("prometheus recorder installed");
            Ok(handle)
        })
        .clone()
        .map_err(MonitoringError::Recorder)
}

/// Drain buffered histogram samples every `period`.
///
/// A recorder installed with `install_recorder` only drains them on
/// `render()`, so without this task an unscraped process keeps every sample.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

pub fn record_request(method: &str, endpoint: &str, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "method" => method.to_string(), "endpoint" => endpoint.to_string())
        .increment(1);
    histogram!(REQUEST_DURATION, "endpoint" => endpoint.to_string()).record(elapsed.as_secs_f64());
}

pub fn set_tasks_total(count: u64) {
    gauge!(TASKS_TOTAL).set(count as f64);
}
