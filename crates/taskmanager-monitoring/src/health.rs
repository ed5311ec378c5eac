//! Health, readiness and liveness reports.
//!
//! The detailed report checks the task store, the cache (reported under the
//! `redis` key whatever the backend) and the disk holding the data path.
//! Only `unhealthy` checks fail the report: a disk that cannot be inspected is
//! reported as `error` but does not take the instance out of rotation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use taskmanager_cache::TaskCache;
use taskmanager_db::TaskStore;

use crate::disk::{disk_usage, round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    NotConfigured,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceInfo {
    pub id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
}

impl InstanceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), started_at: Utc::now() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseCheck {
    pub status: CheckStatus,
    pub response_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub backend: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheCheck {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_commands: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_clients: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
}

impl CacheCheck {
    fn not_configured() -> Self {
        Self {
            status: CheckStatus::NotConfigured,
            response_time_ms: None,
            total_commands: None,
            connected_clients: None,
            entries: None,
            error: None,
            message: Some("Cache not configured".to_string()),
            backend: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskCheck {
    pub status: CheckStatus,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Checks {
    pub database: DatabaseCheck,
    pub redis: CacheCheck,
    pub disk: DiskCheck,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetrics {
    pub total_response_time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: CheckStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub version: String,
    pub environment: String,
    pub instance: InstanceInfo,
    pub checks: Checks,
    pub metrics: ReportMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unhealthy_services: Vec<&'static str>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub instance: String,
    pub timestamp: DateTime<Utc>,
}

fn elapsed_ms(start: Instant) -> f64 {
    round2(start.elapsed().as_secs_f64() * 1000.0)
}

/// Runs the checks against the live backends.
#[derive(Clone)]
pub struct HealthChecker {
    store: Arc<dyn TaskStore>,
    cache: Option<Arc<dyn TaskCache>>,
    instance: InstanceInfo,
    version: String,
    environment: String,
    disk_path: PathBuf,
    started: Instant,
}

impl HealthChecker {
    pub fn new(
        store: Arc<dyn TaskStore>,
        cache: Option<Arc<dyn TaskCache>>,
        instance: InstanceInfo,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            instance,
            version: version.into(),
            environment: environment.into(),
            disk_path: PathBuf::from("/"),
            started: Instant::now(),
        }
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    pub fn instance(&self) -> &InstanceInfo {
        &self.instance
    }

    pub async fn report(&self) -> HealthReport {
        let start = Instant::now();

        let database = self.check_database().await;
        let redis = self.check_cache().await;
        let disk = self.check_disk().await;

        let mut unhealthy_services = Vec::new();
        if database.status == CheckStatus::Unhealthy {
            unhealthy_services.push("database");
        }
        if redis.status == CheckStatus::Unhealthy {
            unhealthy_services.push("redis");
        }
        if disk.status == CheckStatus::Unhealthy {
            unhealthy_services.push("disk");
        }

        let status = if unhealthy_services.is_empty() {
            CheckStatus::Healthy
        } else {
            tracing::warn!(services = ?unhealthy_services, "health check failed");
            CheckStatus::Unhealthy
        };

        HealthReport {
            status,
            timestamp: Utc::now(),
            uptime_seconds: round2(self.started.elapsed().as_secs_f64()),
            version: self.version.clone(),
            environment: self.environment.clone(),
            instance: self.instance.clone(),
            checks: Checks { database, redis, disk },
            metrics: ReportMetrics { total_response_time_ms: elapsed_ms(start) },
            unhealthy_services,
        }
    }

    /// Ready once the store and, when configured, the cache answer.
    pub async fn readiness(&self) -> Readiness {
        let result = async {
            self.store.ping().await.map_err(|e| e.to_string())?;
            if let Some(cache) = &self.cache {
                cache.ping().await.map_err(|e| e.to_string())?;
            }
            Ok::<(), String>(())
        }
        .await;

        match result {
            Ok(()) => Readiness { status: "ready", instance: Some(self.instance.id.clone()), error: None },
            Err(error) => {
                tracing::warn!(%error, "readiness check failed");
                Readiness { status: "not_ready", instance: None, error: Some(error) }
            }
        }
    }

    pub fn liveness(&self) -> Liveness {
        Liveness { status: "alive", instance: self.instance.id.clone(), timestamp: Utc::now() }
    }

    async fn check_database(&self) -> DatabaseCheck {
        let start = Instant::now();
        let backend = self.store.backend();
        let result = async {
            self.store.ping().await?;
            self.store.count().await
        }
        .await;

        match result {
            Ok(count) => DatabaseCheck {
                status: CheckStatus::Healthy,
                response_time_ms: elapsed_ms(start),
                tasks_count: Some(count),
                error: None,
                backend,
            },
            Err(e) => DatabaseCheck {
                status: CheckStatus::Unhealthy,
                response_time_ms: elapsed_ms(start),
                tasks_count: None,
                error: Some(e.to_string()),
                backend,
            },
        }
    }

    async fn check_cache(&self) -> CacheCheck {
        let Some(cache) = &self.cache else {
            return CacheCheck::not_configured();
        };
        let start = Instant::now();
        let result = async {
            cache.ping().await?;
            cache.stats().await
        }
        .await;

        match result {
            Ok(stats) => CacheCheck {
                status: CheckStatus::Healthy,
                response_time_ms: Some(elapsed_ms(start)),
                total_commands: Some(stats.total_commands),
                connected_clients: Some(stats.connected_clients),
                entries: stats.entries,
                error: None,
                message: None,
                backend: Some(cache.backend()),
            },
            Err(e) => CacheCheck {
                status: CheckStatus::Unhealthy,
                response_time_ms: Some(elapsed_ms(start)),
                total_commands: None,
                connected_clients: None,
                entries: None,
                error: Some(e.to_string()),
                message: None,
                backend: Some(cache.backend()),
            },
        }
    }

    async fn check_disk(&self) -> DiskCheck {
        let path = self.disk_path.clone();
        let lookup = path.clone();
        let usage = tokio::task::spawn_blocking(move || disk_usage(&lookup)).await;

        match usage {
            Ok(Some(usage)) => DiskCheck {
                status: CheckStatus::Healthy,
                path,
                total_gb: Some(usage.total_gb()),
                used_gb: Some(usage.used_gb()),
                free_gb: Some(usage.free_gb()),
                percent_used: Some(usage.percent_used()),
                error: None,
            },
            Ok(None) => DiskCheck {
                status: CheckStatus::Error,
                error: Some(format!("no mounted disk contains {}", path.display())),
                path,
                total_gb: None,
                used_gb: None,
                free_gb: None,
                percent_used: None,
            },
            Err(e) => DiskCheck {
                status: CheckStatus::Error,
                path,
                total_gb: None,
                used_gb: None,
                free_gb: None,
                percent_used: None,
                error: Some(e.to_string()),
            },
        }
    }
}
