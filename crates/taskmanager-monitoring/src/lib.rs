//! Observability for the task manager: Prometheus metrics plus the health,
//! readiness and liveness reports served by the web crate.

pub mod disk;
pub mod error;
pub mod health;
pub mod recorder;

pub use disk::{disk_usage, DiskUsage};
pub use error::{MonitoringError, Result};
pub use health::{
    CacheCheck, CheckStatus, Checks, DatabaseCheck, DiskCheck, HealthChecker, HealthReport,
    InstanceInfo, Liveness, Readiness,
};
pub use recorder::{
    install_recorder, record_request, set_tasks_total, spawn_upkeep, PrometheusHandle, UPKEEP_INTERVAL,
};
