//! Configuration loading for TaskManager.
//!
//! Sources, lowest precedence first:
//!   1. built-in defaults (per `ENVIRONMENT` profile)
//!   2. an optional TOML file (`TASKMANAGER_CONFIG`, else `taskmanager.toml` if present)
//!   3. environment variables, after `.env` has been loaded
//!
//! See `taskmanager.example.toml` for the file layout.

mod error;
mod modes;

pub use error::{ConfigError, Result};
pub use modes::{CacheMode, Environment, StorageMode};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "taskmanager.toml";
const VERSION_FILE: &str = "VERSION";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    /// Profile default unless set explicitly.
    pub debug: Option<bool>,
    /// Profile default unless set explicitly.
    pub log_level: Option<String>,
    /// Read from the `VERSION` file when absent.
    pub version: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub instance: InstanceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 5000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default = "default_instance_id")]
    pub id: String,
    #[serde(default = "default_instance_name")]
    pub name: String,
}

fn default_instance_id()   -> String { "unknown".to_string() }
fn default_instance_name() -> String { "Unknown Instance".to_string() }

impl Default for InstanceConfig {
    fn default() -> Self {
        Self { id: default_instance_id(), name: default_instance_name() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Inferred from `url` when unset.
    pub mode: Option<StorageMode>,
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_connect_retry_delay_secs")]
    pub connect_retry_delay_secs: u64,
}

fn default_max_connections()          -> u32 { 10 }
fn default_connect_retries()          -> u32 { 5 }
fn default_connect_retry_delay_secs() -> u64 { 2 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            mode: None,
            url: None,
            max_connections: default_max_connections(),
            connect_retries: default_connect_retries(),
            connect_retry_delay_secs: default_connect_retry_delay_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn storage_mode(&self) -> StorageMode {
        self.mode.unwrap_or(if self.url.is_some() {
            StorageMode::Postgres
        } else {
            StorageMode::InMemory
        })
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_secs(self.connect_retry_delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Inferred from `redis_url` when unset.
    pub mode: Option<CacheMode>,
    pub redis_url: Option<String>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 { 300 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { mode: None, redis_url: None, ttl_secs: default_ttl_secs() }
    }
}

impl CacheConfig {
    pub fn cache_mode(&self) -> CacheMode {
        self.mode.unwrap_or(if self.redis_url.is_some() {
            CacheMode::Redis
        } else {
            CacheMode::None
        })
    }

    /// TTL handed to the cache; Redis rejects `SETEX` with zero seconds.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_disk_check_path")]
    pub disk_check_path: String,
}

fn default_disk_check_path() -> String { "/".to_string() }

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { disk_check_path: default_disk_check_path() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            debug: None,
            log_level: None,
            version: None,
            server: ServerConfig::default(),
            instance: InstanceConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the optional TOML file, and the process environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let mut config = match std::env::var("TASKMANAGER_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            Err(_) => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        if config.version.is_none() {
            config.version = read_version_file(VERSION_FILE);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment variables read through `lookup`. Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var("ENVIRONMENT") {
            self.environment = Environment::from_name(&v);
        }
        if let Some(v) = var("DEBUG") {
            self.debug = Some(v.eq_ignore_ascii_case("true") || v == "1");
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.log_level = Some(v);
        }
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = parse_value("PORT", &v)?;
        }
        if let Some(v) = var("INSTANCE_ID") {
            self.instance.id = v;
        }
        if let Some(v) = var("INSTANCE_NAME") {
            self.instance.name = v;
        }

        if let Some(v) = var("STORAGE_MODE") {
            self.database.mode = Some(v.parse()?);
        }
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = var("DB_CONNECT_RETRIES") {
            self.database.connect_retries = parse_value("DB_CONNECT_RETRIES", &v)?;
        }
        if let Some(v) = var("DB_CONNECT_RETRY_DELAY_SECS") {
            self.database.connect_retry_delay_secs = parse_value("DB_CONNECT_RETRY_DELAY_SECS", &v)?;
        }

        if let Some(v) = var("CACHE_MODE") {
            self.cache.mode = Some(v.parse()?);
        }
        if let Some(v) = var("REDIS_URL") {
            self.cache.redis_url = Some(v);
        }
        if let Some(v) = var("CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_value("CACHE_TTL_SECS", &v)?;
        }

        if let Some(v) = var("DISK_CHECK_PATH") {
            self.monitoring.disk_check_path = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.storage_mode() == StorageMode::Postgres && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.cache.cache_mode() == CacheMode::Redis && self.cache.redis_url.is_none() {
            return Err(ConfigError::MissingRedisUrl);
        }
        if self.database.connect_retries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_CONNECT_RETRIES".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn debug(&self) -> bool {
        self.debug.unwrap_or(self.environment.default_debug())
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(self.environment.default_log_level())
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn read_version_file(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

mod tests;
