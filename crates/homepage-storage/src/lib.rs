//! # homepage-storage
//!
//! Object store backends for home page attachments:
//! - [`S3ObjectStore`] for any S3-compatible bucket (AWS, MinIO, R2)
//! - [`FilesystemObjectStore`] for local development
//!
//! Both implement `homepage_core::ObjectStore`; [`build_object_store`] picks
//! one from a [`StorageConfig`].

pub mod config;
pub mod filesystem;
pub mod public_url;
pub mod s3;

use std::sync::Arc;

use homepage_core::{Error, ObjectStore, Result};
use tracing::info;

pub use config::{FilesystemConfig, S3Config, StorageBackendKind, StorageConfig};
pub use filesystem::FilesystemObjectStore;
pub use public_url::PublicUrls;
pub use s3::S3ObjectStore;

/// Build the configured object store.
///
/// The filesystem backend is probed with a write/read/delete round trip
/// before it is returned.
pub async fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackendKind::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| Error::Config("S3 backend selected without S3 settings".to_string()))?;
            Ok(Arc::new(S3ObjectStore::connect(s3).await?))
        }
        StorageBackendKind::Filesystem => {
            let store = FilesystemObjectStore::new(
                &config.filesystem.base_path,
                &config.filesystem.public_base_url,
            );
            store.verify().await?;
            info!(
                subsystem = "storage",
                component = "filesystem",
                op = "connect",
                base_path = %config.filesystem.base_path,
                public_base_url = %config.filesystem.public_base_url,
                "Filesystem object store ready"
            );
            Ok(Arc::new(store))
        }
    }
}
