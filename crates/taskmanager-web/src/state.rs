//! Shared application state for the web server.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use taskmanager_cache::{MokaTaskCache, RedisTaskCache, TaskCache};
use taskmanager_config::{CacheMode, Config, StorageMode};
use taskmanager_db::{InMemoryTaskStore, PgTaskStore, RetryPolicy, TaskStore};
use taskmanager_monitoring::{install_recorder, HealthChecker, InstanceInfo, PrometheusHandle};

use crate::service::TaskService;
use crate::templates::Templates;

/// Facts about this process shown on the index page.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub version: String,
    pub environment: String,
    pub instance: InstanceInfo,
}

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub health: HealthChecker,
    pub metrics: PrometheusHandle,
    pub templates: Templates,
    pub info: AppInfo,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TaskStore>,
        cache: Option<Arc<dyn TaskCache>>,
        cache_ttl: Duration,
        info: AppInfo,
        disk_check_path: &str,
    ) -> anyhow::Result<Self> {
        let health = HealthChecker::new(
            store.clone(),
            cache.clone(),
            info.instance.clone(),
            info.version.clone(),
            info.environment.clone(),
        )
        .with_disk_path(disk_check_path);

        Ok(Self {
            tasks: TaskService::new(store, cache, cache_ttl),
            health,
            metrics: install_recorder()?,
            templates: Templates::new()?,
            info,
        })
    }

    /// Build the backends selected by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = open_store(config).await?;
        let cache = open_cache(config).await?;
        let info = AppInfo {
            version: config.version().to_string(),
            environment: config.environment.as_str().to_string(),
            instance: InstanceInfo::new(&config.instance.id, &config.instance.name),
        };
        Self::new(store, cache, config.cache.ttl(), info, &config.monitoring.disk_check_path)
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn TaskStore>> {
    match config.database.storage_mode() {
        StorageMode::InMemory => {
            tracing::info!("using in-memory task storage");
            Ok(Arc::new(InMemoryTaskStore::new()))
        }
        StorageMode::Postgres => {
            let url = config.database.url.as_deref().context("DATABASE_URL is not set")?;
            let policy = RetryPolicy::new(config.database.connect_retries, config.database.connect_retry_delay());
            let store = PgTaskStore::connect(url, config.database.max_connections, policy)
                .await
                .context("could not connect to PostgreSQL")?;
            store.migrate().await.context("could not create the tasks schema")?;
            Ok(Arc::new(store))
        }
    }
}

/// A Redis server that does not answer at startup disables caching for the
/// life of the process.
async fn open_cache(config: &Config) -> anyhow::Result<Option<Arc<dyn TaskCache>>> {
    match config.cache.cache_mode() {
        CacheMode::None => Ok(None),
        CacheMode::Memory => {
            tracing::info!(ttl_secs = config.cache.ttl_secs, "using in-process task cache");
            let cache: Arc<dyn TaskCache> = Arc::new(MokaTaskCache::new());
            Ok(Some(cache))
        }
        CacheMode::Redis => {
            let url = config.cache.redis_url.as_deref().context("REDIS_URL is not set")?;
            let cache = RedisTaskCache::from_url(url).context("invalid REDIS_URL")?;
            match cache.ping().await {
                Ok(()) => {
                    tracing::info!("Redis connected");
                    let cache: Arc<dyn TaskCache> = Arc::new(cache);
                    Ok(Some(cache))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Redis connection failed, running without cache");
                    Ok(None)
                }
            }
        }
    }
}

pub type SharedState = Arc<AppState>;
