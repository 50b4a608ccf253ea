//! Object storage configuration.
//!
//! Values come from environment variables; every timeout and limit has a
//! default in `homepage_core::defaults`.

use std::time::Duration;

use homepage_core::defaults::{
    STORAGE_CONNECT_TIMEOUT_SECS, STORAGE_OPERATION_TIMEOUT_SECS, STORAGE_READ_TIMEOUT_SECS,
};
use homepage_core::{Error, Result};

/// Default local directory for the filesystem backend.
pub const DEFAULT_FILE_STORAGE_PATH: &str = "/var/lib/homepage/media";

/// Default base URL the filesystem backend reports objects under.
pub const DEFAULT_FILE_STORAGE_PUBLIC_URL: &str = "http://localhost:3000/media";

/// Default S3 region.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Which object store implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Filesystem,
}

impl StorageBackendKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "filesystem" | "fs" | "local" => Ok(Self::Filesystem),
            other => Err(Error::Config(format!(
                "unknown STORAGE_BACKEND '{}': expected 's3' or 'filesystem'",
                other
            ))),
        }
    }
}

/// S3-compatible bucket settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). `None` targets AWS.
    pub endpoint: Option<String>,
    /// Static credentials; when absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
    /// CDN host that fronts the bucket, e.g. `d111111abcdef8.cloudfront.net`.
    pub cdn_domain: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub operation_timeout: Duration,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
            cdn_domain: None,
            connect_timeout: Duration::from_secs(STORAGE_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(STORAGE_READ_TIMEOUT_SECS),
            operation_timeout: Duration::from_secs(STORAGE_OPERATION_TIMEOUT_SECS),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_cdn_domain(mut self, domain: impl Into<String>) -> Self {
        self.cdn_domain = Some(domain.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

/// Local directory settings for development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemConfig {
    pub base_path: String,
    pub public_base_url: String,
}

impl FilesystemConfig {
    /// Path component of `public_base_url`, e.g. `/media` for
    /// `http://localhost:3000/media/`. `None` when the URL has no path.
    pub fn public_path(&self) -> Option<String> {
        let url = self.public_base_url.trim();
        let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let path = after_scheme.find('/').map(|i| &after_scheme[i..])?;
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }
}

/// Complete storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    pub s3: Option<S3Config>,
    pub filesystem: FilesystemConfig,
}

impl StorageConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match get("STORAGE_BACKEND") {
            Some(v) => StorageBackendKind::parse(&v)?,
            None if get("S3_BUCKET").is_some() => StorageBackendKind::S3,
            None => StorageBackendKind::Filesystem,
        };

        let s3 = match get("S3_BUCKET") {
            Some(bucket) => {
                let mut s3 = S3Config::new(
                    bucket,
                    get("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                );
                s3.endpoint = get("S3_ENDPOINT").map(|e| e.trim_end_matches('/').to_string());
                s3.access_key_id = get("S3_ACCESS_KEY_ID");
                s3.secret_access_key = get("S3_SECRET_ACCESS_KEY");
                s3.force_path_style = get("S3_FORCE_PATH_STYLE")
                    .map(|v| parse_bool("S3_FORCE_PATH_STYLE", &v))
                    .transpose()?
                    .unwrap_or(false);
                s3.cdn_domain = get("CDN_DOMAIN");
                if let Some(secs) = get("S3_CONNECT_TIMEOUT_SECS") {
                    s3.connect_timeout = parse_secs("S3_CONNECT_TIMEOUT_SECS", &secs)?;
                }
                if let Some(secs) = get("S3_READ_TIMEOUT_SECS") {
                    s3.read_timeout = parse_secs("S3_READ_TIMEOUT_SECS", &secs)?;
                }
                if let Some(secs) = get("S3_OPERATION_TIMEOUT_SECS") {
                    s3.operation_timeout = parse_secs("S3_OPERATION_TIMEOUT_SECS", &secs)?;
                }
                if s3.access_key_id.is_some() != s3.secret_access_key.is_some() {
                    return Err(Error::Config(
                        "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together".to_string(),
                    ));
                }
                Some(s3)
            }
            None => None,
        };

        if backend == StorageBackendKind::S3 && s3.is_none() {
            return Err(Error::Config(
                "STORAGE_BACKEND=s3 requires S3_BUCKET".to_string(),
            ));
        }

        let filesystem = FilesystemConfig {
            base_path: get("FILE_STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_FILE_STORAGE_PATH.to_string()),
            public_base_url: get("FILE_STORAGE_PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_FILE_STORAGE_PUBLIC_URL.to_string()),
        };

        Ok(Self {
            backend,
            s3,
            filesystem,
        })
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::Config(format!("{} must be a positive integer, got '{}'", name, value)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{} must be a boolean, got '{}'", name, value))),
    }
}
