//! Server configuration loaded from the environment.
//!
//! Environment variables:
//!   DATABASE_URL           - PostgreSQL URL (default: postgres://localhost/visa_tracker)
//!   STORAGE_BACKEND        - "postgres" or "memory" (default: postgres)
//!   HOST / PORT            - bind address (default: 0.0.0.0:5000)
//!   ALLOWED_ORIGINS        - comma-separated CORS origins (default: http://localhost:3000)
//!   RATE_LIMIT_ENABLED     - "true"/"false" (default: true)
//!   RATE_LIMIT_REQUESTS    - requests per period (default: 100)
//!   RATE_LIMIT_PERIOD_SECS - period in seconds (default: 60)
//!   DB_MAX_CONNECTIONS     - pool size (default: 10)
//!   RUN_MIGRATIONS         - apply migrations at startup (default: true)

use std::str::FromStr;

use axum::http::HeaderValue;
use tracing::warn;

use visa_core::defaults;
use visa_db::pool::DEFAULT_MAX_CONNECTIONS;

/// Which storage backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend '{}'", other)),
        }
    }
}

/// Global rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u64,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: defaults::RATE_LIMIT_REQUESTS,
            period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
        }
    }
}

/// Everything the binary needs to start serving.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit: RateLimitConfig,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            storage_backend: StorageBackend::Postgres,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
            rate_limit: RateLimitConfig::default(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to postgres storage backend");
                base.storage_backend
            }),
            None => base.storage_backend,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| parse_allowed_origins(&raw))
            .unwrap_or(base.allowed_origins);

        Self {
            host: lookup("HOST").unwrap_or(base.host),
            port: parse_or("PORT", lookup("PORT"), base.port),
            database_url: lookup("DATABASE_URL").unwrap_or(base.database_url),
            storage_backend,
            allowed_origins,
            rate_limit: RateLimitConfig {
                enabled: parse_flag(lookup("RATE_LIMIT_ENABLED"), base.rate_limit.enabled),
                requests: parse_or(
                    "RATE_LIMIT_REQUESTS",
                    lookup("RATE_LIMIT_REQUESTS"),
                    base.rate_limit.requests,
                ),
                period_secs: parse_or(
                    "RATE_LIMIT_PERIOD_SECS",
                    lookup("RATE_LIMIT_PERIOD_SECS"),
                    base.rate_limit.period_secs,
                ),
            },
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                base.db_max_connections,
            ),
            run_migrations: parse_flag(lookup("RUN_MIGRATIONS"), base.run_migrations),
        }
    }

    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bind the listening socket. `HOST` may be a hostname such as `localhost`.
    pub async fn bind_listener(&self) -> std::io::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind(self.bind_address()).await
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(
                key,
                value = %value,
                default = %default,
                "Invalid numeric setting, using default"
            );
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    raw.map(|v| v == "true" || v == "1").unwrap_or(default)
}

/// Parse a comma-separated origin list, dropping entries that are not valid
/// header values. An empty list falls back to the default origin.
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        return vec![HeaderValue::from_static(defaults::ALLOWED_ORIGINS)];
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert!(config.run_migrations);
        assert_eq!(config.allowed_origins.len(), 1);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "memory"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("RATE_LIMIT_REQUESTS", "5"),
            ("RUN_MIGRATIONS", "0"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests, 5);
        assert!(!config.run_migrations);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_bind_listener_resolves_hostnames() {
        let config = config_from(&[("HOST", "localhost"), ("PORT", "0")]);
        let listener = config.bind_listener().await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("DB_MAX_CONNECTIONS", "-3")]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_unknown_backend_falls_back_to_postgres() {
        let config = config_from(&[("STORAGE_BACKEND", "mongo")]);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let origins = parse_allowed_origins("https://visa.example.com, http://localhost:3000 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0].to_str().unwrap(), "https://visa.example.com");
        assert_eq!(origins[1].to_str().unwrap(), "http://localhost:3000");

        let origins = parse_allowed_origins("  ");
        assert_eq!(origins[0].to_str().unwrap(), "http://localhost:3000");
    }
}
