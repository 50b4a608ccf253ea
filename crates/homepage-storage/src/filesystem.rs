//! Local filesystem object store for development.
//!
//! Objects live at `{base_path}/{key}` and are served by whatever fronts
//! `public_base_url`. ACL and cache headers are not persisted.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use homepage_core::{Error, ObjectStore, PutOptions, Result};

use crate::public_url::PublicUrls;

/// Object store writing into a local directory.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    urls: PublicUrls,
}

impl FilesystemObjectStore {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            urls: PublicUrls::with_base(public_base_url),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key below the base directory. Keys with absolute or parent
    /// components are rejected.
    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::Storage(format!("invalid object key: {:?}", key)));
        }
        Ok(self.base_path.join(relative))
    }

    /// Write, read back and delete a probe file.
    ///
    /// Run at startup so permission problems surface before the first upload.
    pub async fn verify(&self) -> Result<()> {
        let probe_dir = self.base_path.join(".health-check");
        let probe = probe_dir.join("probe.bin");
        let data = b"storage-health-check";

        fs::create_dir_all(&probe_dir).await?;
        fs::write(&probe, data).await?;
        let read_back = fs::read(&probe).await?;
        if read_back != data {
            return Err(Error::Storage(format!(
                "read-back mismatch at {}",
                probe.display()
            )));
        }
        fs::remove_file(&probe).await?;
        let _ = fs::remove_dir(&probe_dir).await;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> Result<()> {
        let full_path = self.full_path(key)?;
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "put",
            storage_key = %key,
            content_type = %options.content_type,
            size_bytes = data.len(),
            "Writing object"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "filesystem store: create_dir_all failed");
                Error::UploadFailed(format!("create {}: {}", parent.display(), e))
            })?;
        }

        // Temp file + rename so readers never see a partial object
        let temp_path = full_path.with_extension("tmp");
        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &full_path).await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::UploadFailed(format!(
                "write {}: {}",
                full_path.display(),
                e
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;
        // Missing objects count as deleted, matching S3 semantics
        if fs::try_exists(&full_path).await? {
            fs::remove_file(&full_path).await?;
        }
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "delete",
            storage_key = %key,
            "Object deleted"
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url(key)
    }
}
