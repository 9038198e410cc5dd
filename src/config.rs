//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::service::RetryPolicy;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Connections kept open when idle
    pub database_min_connections: u32,

    /// How long to wait for a pooled connection
    pub database_acquire_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub log_format: LogFormat,

    /// Requests running longer are cancelled (uncommitted work rolls back)
    pub request_timeout: Duration,

    /// Attempts per wallet operation on transient storage failures
    pub operation_max_attempts: u32,

    /// First retry backoff
    pub operation_retry_base: Duration,

    /// Create the schema at startup instead of only checking it
    pub auto_migrate: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections: u32 = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 50)?;
        let database_min_connections: u32 = parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", 5)?;
        if database_min_connections > database_max_connections {
            return Err(ConfigError::InvalidValue("DATABASE_MIN_CONNECTIONS"));
        }

        let acquire_timeout_secs: u64 = parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue("PORT"));
        }

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let default_format = if environment == "production" {
            LogFormat::Json
        } else {
            LogFormat::Text
        };
        let log_format = parse_or(&lookup, "LOG_FORMAT", default_format)?;

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?;

        let operation_max_attempts: u32 = parse_or(&lookup, "OPERATION_MAX_ATTEMPTS", 3)?;
        if operation_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("OPERATION_MAX_ATTEMPTS"));
        }

        let operation_retry_base_ms: u64 = parse_or(&lookup, "OPERATION_RETRY_BASE_MS", 50)?;

        let auto_migrate: bool = parse_or(&lookup, "AUTO_MIGRATE", false)?;

        Ok(Self {
            database_url,
            database_max_connections,
            database_min_connections,
            database_acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            host,
            port,
            environment,
            log_format,
            request_timeout: Duration::from_secs(request_timeout_secs),
            operation_max_attempts,
            operation_retry_base: Duration::from_millis(operation_retry_base_ms),
            auto_migrate,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Retry policy for wallet operations
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.operation_max_attempts, self.operation_retry_base)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
