use std::{path::PathBuf, time::Duration};

use catalog_core::database::{
    PostgresOptions, RetryPolicy,
    hilo::DEFAULT_HILO_BLOCK_SIZE,
    retry::{DEFAULT_BASE_RETRY_DELAY, DEFAULT_MAX_RETRY_COUNT, DEFAULT_MAX_RETRY_DELAY},
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Validated PostgreSQL URL; `None` only for configs built in code.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_retry_count: u32,
    pub max_retry_delay: Duration,
    pub base_retry_delay: Duration,
    pub hilo_block_size: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pool = PostgresOptions::default();
        Self {
            url: None,
            max_connections: pool.max_connections,
            min_connections: pool.min_connections,
            acquire_timeout: pool.acquire_timeout,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
            base_retry_delay: DEFAULT_BASE_RETRY_DELAY,
            hilo_block_size: DEFAULT_HILO_BLOCK_SIZE,
        }
    }
}

impl DatabaseConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retry_count, self.max_retry_delay)
            .with_base_delay(self.base_retry_delay)
    }

    pub fn pool_options(&self) -> PostgresOptions {
        PostgresOptions {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            acquire_timeout: self.acquire_timeout,
        }
    }
}

/// Empty `allowed_origins` disables the CORS layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_enabled(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

/// Where the configuration came from, for startup logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

/// Non-fatal observations gathered while loading.
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(&mut self, message: S, hint: H) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
