//! Public URL construction for stored objects.
//!
//! Precedence: CDN domain, then custom endpoint (path-style), then the
//! virtual-hosted AWS bucket URL.

use crate::config::S3Config;

/// Resolves object keys to publicly reachable URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    base: String,
}

impl PublicUrls {
    /// Objects are served under `base`, e.g. `https://cdn.example.com`.
    pub fn with_base(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// URLs for an S3 bucket, honouring a configured CDN domain.
    pub fn for_s3(config: &S3Config) -> Self {
        if let Some(domain) = config.cdn_domain.as_deref() {
            let host = domain
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            return Self::with_base(format!("https://{}", host));
        }
        match config.endpoint.as_deref() {
            Some(endpoint) => Self::with_base(format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                config.bucket
            )),
            None => Self::with_base(format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            )),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL for one key.
    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base, key.trim_start_matches('/'))
    }
}
