#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let mut config = Config::default();
        config.apply_env(lookup_from(pairs))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_are_development_in_memory() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.debug());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.database.storage_mode(), StorageMode::InMemory);
        assert_eq!(config.cache.cache_mode(), CacheMode::None);
        assert_eq!(config.cache.ttl().as_secs(), 300);
        assert_eq!(config.instance.id, "unknown");
        assert_eq!(config.instance.name, "Unknown Instance");
    }

    #[test]
    fn test_production_profile() {
        let config = config_from(&[("ENVIRONMENT", "production")]).unwrap();
        assert!(!config.debug());
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_unknown_environment_falls_back_to_development() {
        let config = config_from(&[("ENVIRONMENT", "staging")]).unwrap();
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_explicit_debug_and_log_level_override_profile() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("DEBUG", "True"),
            ("LOG_LEVEL", "warn"),
        ])
        .unwrap();
        assert!(config.debug());
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_urls_infer_backends() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://user:pass@db/tasks"),
            ("REDIS_URL", "redis://redis:6379/0"),
        ])
        .unwrap();
        assert_eq!(config.database.storage_mode(), StorageMode::Postgres);
        assert_eq!(config.cache.cache_mode(), CacheMode::Redis);
    }

    #[test]
    fn test_blank_url_is_unset() {
        let config = config_from(&[("DATABASE_URL", "   ")]).unwrap();
        assert!(config.database.url.is_none());
        assert_eq!(config.database.storage_mode(), StorageMode::InMemory);
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let err = config_from(&[("STORAGE_MODE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn test_redis_without_url_is_rejected() {
        let err = config_from(&[("CACHE_MODE", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRedisUrl));
    }

    #[test]
    fn test_explicit_mode_wins_over_url() {
        let config = config_from(&[
            ("STORAGE_MODE", "memory"),
            ("DATABASE_URL", "postgres://localhost/db"),
            ("CACHE_MODE", "memory"),
        ])
        .unwrap();
        assert_eq!(config.database.storage_mode(), StorageMode::InMemory);
        assert_eq!(config.cache.cache_mode(), CacheMode::Memory);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_cache_mode_is_rejected() {
        let err = config_from(&[("CACHE_MODE", "memcached")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCacheMode(_)));
    }

    #[test]
    fn test_zero_retries_is_rejected() {
        assert!(config_from(&[("DB_CONNECT_RETRIES", "0")]).is_err());
    }

    #[test]
    fn test_zero_ttl_is_raised_to_one_second() {
        let config = config_from(&[("CACHE_TTL_SECS", "0")]).unwrap();
        assert_eq!(config.cache.ttl().as_secs(), 1);
    }

    #[test]
    fn test_toml_then_env_overlay() {
        let mut config = Config::from_toml(
            r#"
            environment = "production"
            version = "0.5.0"

            [server]
            port = 8080

            [database]
            url = "postgres://file/db"
            connect_retries = 3

            [cache]
            mode = "memory"
            ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.connect_retries, 3);

        config.apply_env(lookup_from(&[("PORT", "9000")])).unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.version(), "0.5.0");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.storage_mode(), StorageMode::Postgres);
        assert_eq!(config.cache.cache_mode(), CacheMode::Memory);
        assert_eq!(config.database.connect_retry_delay().as_secs(), 2);
    }

    #[test]
    fn test_unknown_environment_in_file_falls_back_to_development() {
        let config = Config::from_toml(r#"environment = "staging""#).unwrap();
        assert_eq!(config.environment, Environment::Development);

        let config = Config::from_toml(r#"environment = "PROD""#).unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::from_file("/nonexistent/taskmanager.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/taskmanager.toml"));
    }

    #[test]
    fn test_example_file_parses() {
        let config = Config::from_toml(include_str!("../../../taskmanager.example.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.instance.id, "app-1");
        assert_eq!(config.database.storage_mode(), StorageMode::InMemory);
        assert_eq!(config.cache.cache_mode(), CacheMode::None);
    }
}
