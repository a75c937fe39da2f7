use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use thiserror::Error;
use url::Url;

use super::{
    models::{
        Config, ConfigMetadata, ConfigWarnings, CorsConfig, DatabaseConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["catalog.toml", "config/catalog.toml"];

/// Merges `.env`, an optional TOML file and the process environment.
/// Environment values win over the file; the file wins over defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DATABASE_URL (or database.url) must be provided")]
    MissingDatabaseUrl,
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}'; expected postgres:// or postgresql://")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match dotenvy::dotenv() {
            Ok(_) => true,
            Err(dotenvy::Error::Io(_)) => false,
            Err(err) => return Err(err.into()),
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Load against an explicit environment snapshot; `load` uses the
    /// process environment after applying `.env`.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No catalog.toml detected; using environment variables and defaults",
            "Create catalog.toml or pass --config to pin settings in a file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let defaults = Config::default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or(defaults.server.host),
        port: parse_env("SERVER_PORT", env.server_port)?
            .or(file_server.port)
            .unwrap_or(defaults.server.port),
    };

    let url = env
        .database_url
        .or(file_database.url)
        .ok_or(ConfigLoadError::MissingDatabaseUrl)?;
    validate_database_url(&url)?;

    let db_defaults = defaults.database;
    let database = DatabaseConfig {
        url: Some(url),
        max_connections: parse_env("DB_MAX_CONNECTIONS", env.db_max_connections)?
            .or(file_database.max_connections)
            .unwrap_or(db_defaults.max_connections),
        min_connections: parse_env("DB_MIN_CONNECTIONS", env.db_min_connections)?
            .or(file_database.min_connections)
            .unwrap_or(db_defaults.min_connections),
        acquire_timeout: pick_duration(
            "DB_ACQUIRE_TIMEOUT",
            env.db_acquire_timeout,
            file_database.acquire_timeout,
        )?
        .unwrap_or(db_defaults.acquire_timeout),
        max_retry_count: parse_env("DB_MAX_RETRY_COUNT", env.db_max_retry_count)?
            .or(file_database.max_retry_count)
            .unwrap_or(db_defaults.max_retry_count),
        max_retry_delay: pick_duration(
            "DB_MAX_RETRY_DELAY",
            env.db_max_retry_delay,
            file_database.max_retry_delay,
        )?
        .unwrap_or(db_defaults.max_retry_delay),
        base_retry_delay: pick_duration(
            "DB_BASE_RETRY_DELAY",
            env.db_base_retry_delay,
            file_database.base_retry_delay,
        )?
        .unwrap_or(db_defaults.base_retry_delay),
        hilo_block_size: parse_env("DB_HILO_BLOCK_SIZE", env.db_hilo_block_size)?
            .or(file_database.hilo_block_size)
            .unwrap_or(db_defaults.hilo_block_size),
    };

    if database.max_connections == 0 {
        return Err(ConfigLoadError::InvalidValue {
            key: "DB_MAX_CONNECTIONS",
            message: "must be at least 1".to_string(),
        });
    }
    if database.min_connections > database.max_connections {
        return Err(ConfigLoadError::InvalidValue {
            key: "DB_MIN_CONNECTIONS",
            message: format!(
                "{} exceeds max_connections {}",
                database.min_connections, database.max_connections
            ),
        });
    }
    if database.hilo_block_size < 1 {
        return Err(ConfigLoadError::InvalidValue {
            key: "DB_HILO_BLOCK_SIZE",
            message: "must be at least 1".to_string(),
        });
    }
    if database.base_retry_delay > database.max_retry_delay {
        warnings.push(format!(
            "DB_BASE_RETRY_DELAY ({}) exceeds DB_MAX_RETRY_DELAY ({}); every retry waits the maximum",
            humantime::format_duration(database.base_retry_delay),
            humantime::format_duration(database.max_retry_delay),
        ));
    }

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };
    if cors.is_wildcard_included() {
        warnings.push_with_hint(
            "CORS allows any origin",
            "List explicit origins in CORS_ALLOWED_ORIGINS for deployed environments",
        );
    }

    let config = Config {
        server,
        database,
        cors,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    Ok((config, warnings))
}

fn parse_env<T>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|err| ConfigLoadError::InvalidValue {
                key,
                message: format!("'{value}': {err}"),
            })
    })
    .transpose()
}

fn pick_duration(
    key: &'static str,
    env: Option<String>,
    file: Option<String>,
) -> Result<Option<Duration>, ConfigLoadError> {
    env.or(file)
        .map(|value| {
            humantime::parse_duration(value.trim()).map_err(|err| {
                ConfigLoadError::InvalidValue {
                    key,
                    message: format!("'{value}': {err}"),
                }
            })
        })
        .transpose()
}

pub fn validate_database_url(url: &str) -> Result<(), ConfigLoadError> {
    let parsed =
        Url::parse(url).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}
