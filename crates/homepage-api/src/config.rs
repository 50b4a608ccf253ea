//! Server configuration from environment variables.

use homepage_core::defaults::{MAX_REQUEST_BODY_BYTES, SERVER_PORT};
use homepage_core::{AppMode, Error, Result};
use homepage_db::DEFAULT_MAX_CONNECTIONS;
use homepage_storage::StorageConfig;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/homepage";

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Deployment tier; also the object key namespace.
    pub app_mode: AppMode,
    pub max_request_body_bytes: usize,
    pub db_max_connections: u32,
    /// Origins allowed to call the API from a browser. Empty denies all.
    pub cors_allowed_origins: Vec<String>,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let app_mode = match get("APP_MODE") {
            Some(mode) => mode.parse()?,
            None => AppMode::default(),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), SERVER_PORT)?,
            app_mode,
            max_request_body_bytes: parse_or(
                "MAX_REQUEST_BODY_BYTES",
                get("MAX_REQUEST_BODY_BYTES"),
                MAX_REQUEST_BODY_BYTES,
            )?,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            storage: StorageConfig::from_lookup(&lookup)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", name, v))),
        None => Ok(default),
    }
}
