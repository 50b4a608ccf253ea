//! Attachment replacement workflow.
//!
//! Each slot goes through the same steps: validate the candidate, upload it
//! under a fresh key, then best-effort delete whatever the slot pointed at
//! before. Callers that persist the new key can run [`AttachmentReplacer::upload`]
//! and [`AttachmentReplacer::cleanup`] separately, deleting only after commit.
//!
//! ```text
//! no file ──────────────────────────────────────────────▶ current key
//! file ─▶ size gate ─▶ content gate ─▶ put(new key) ─▶ delete(old key)* ─▶ new key
//!            │              │               │                 │
//!     PayloadTooLarge  InvalidContent  UploadFailed      logged only
//! ```
//!
//! Two orphan windows are accepted: a crash after upload but before the
//! caller commits leaves the new object unreferenced, and a failed delete
//! leaves the old one behind.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::defaults::{HERO_MAX_SIZE, HERO_PREFIX, IMMUTABLE_CACHE_CONTROL, LOGO_MAX_SIZE, LOGO_PREFIX};
use crate::error::{Error, Result};
use crate::keys::generate_object_key;
use crate::models::UploadCandidate;
use crate::traits::{ContentValidator, ObjectAcl, ObjectStore, PutOptions, ValidatedContent};

/// Key namespace and size limit of one attachment slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPolicy {
    pub prefix: String,
    pub max_size: u64,
}

impl SlotPolicy {
    pub fn new(prefix: impl Into<String>, max_size: u64) -> Self {
        Self {
            prefix: prefix.into(),
            max_size,
        }
    }

    /// Logo slot: `home/logo`, 5 MiB.
    pub fn logo() -> Self {
        Self::new(LOGO_PREFIX, LOGO_MAX_SIZE)
    }

    /// Hero image slot: `home/hero`, 8 MiB.
    pub fn hero() -> Self {
        Self::new(HERO_PREFIX, HERO_MAX_SIZE)
    }
}

/// What happened to the object a slot previously pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing to remove: no file was supplied, or the slot was empty.
    NotNeeded,
    /// The old object was deleted.
    Deleted { key: String },
    /// Deletion failed; the old object is orphaned.
    Failed { key: String, reason: String },
}

impl CleanupOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of one replacement call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Key the caller should persist for the slot.
    pub key: Option<String>,
    /// Whether a new object was uploaded.
    pub uploaded: bool,
    /// Key the upload superseded, if the slot held one.
    pub superseded: Option<String>,
    pub cleanup: CleanupOutcome,
}

impl Replacement {
    fn unchanged(current_key: Option<&str>) -> Self {
        Self {
            key: current_key.map(str::to_string),
            uploaded: false,
            superseded: None,
            cleanup: CleanupOutcome::NotNeeded,
        }
    }

    /// The new key, only when an upload happened.
    pub fn new_key(&self) -> Option<&str> {
        if self.uploaded {
            self.key.as_deref()
        } else {
            None
        }
    }
}

/// A candidate that passed the size and content gates.
#[derive(Debug, Clone)]
pub struct CheckedUpload {
    pub candidate: UploadCandidate,
    pub content: ValidatedContent,
}

/// Runs the replace-and-cleanup workflow against an object store.
#[derive(Clone)]
pub struct AttachmentReplacer {
    store: Arc<dyn ObjectStore>,
    namespace: String,
    cache_control: String,
}

impl AttachmentReplacer {
    /// Create a replacer writing under the given key namespace
    /// (normally the deployment tier).
    pub fn new(store: Arc<dyn ObjectStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            cache_control: IMMUTABLE_CACHE_CONTROL.to_string(),
        }
    }

    /// Override the Cache-Control directive sent with uploads.
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Public URL for a stored key; absent key gives an absent URL.
    pub fn public_url(&self, key: Option<&str>) -> Option<String> {
        key.map(|k| self.store.public_url(k))
    }

    /// Replace the object behind one slot: [`upload`](Self::upload) followed
    /// by [`cleanup`](Self::cleanup).
    ///
    /// # Errors
    ///
    /// - `Error::PayloadTooLarge` when the declared size exceeds the slot limit
    /// - `Error::InvalidContent` when the validator rejects the bytes
    /// - `Error::UploadFailed` when the object store rejects the upload
    ///
    /// A failed delete of the old object is never an error; it is reported in
    /// [`Replacement::cleanup`].
    pub async fn replace(
        &self,
        candidate: Option<UploadCandidate>,
        current_key: Option<&str>,
        slot: &SlotPolicy,
        validator: &dyn ContentValidator,
    ) -> Result<Replacement> {
        let mut replacement = self.upload(candidate, current_key, slot, validator).await?;
        self.cleanup(&mut replacement, slot).await;
        Ok(replacement)
    }

    /// Size gate and content gate, without touching storage.
    pub fn check(
        &self,
        candidate: &UploadCandidate,
        slot: &SlotPolicy,
        validator: &dyn ContentValidator,
    ) -> Result<ValidatedContent> {
        if candidate.declared_size > slot.max_size {
            debug!(
                subsystem = "attachments",
                component = "replacer",
                op = "check",
                slot = %slot.prefix,
                size_bytes = candidate.declared_size,
                max_size = slot.max_size,
                "Rejected oversized upload"
            );
            return Err(Error::PayloadTooLarge {
                size: candidate.declared_size,
                max: slot.max_size,
            });
        }
        validator.validate(candidate)
    }

    /// Run both gates on an optional candidate, pairing it with the detected
    /// content so a later [`upload_checked`](Self::upload_checked) does not
    /// decode the bytes again.
    pub fn gate(
        &self,
        candidate: Option<UploadCandidate>,
        slot: &SlotPolicy,
        validator: &dyn ContentValidator,
    ) -> Result<Option<CheckedUpload>> {
        candidate
            .map(|candidate| {
                let content = self.check(&candidate, slot, validator)?;
                Ok(CheckedUpload { candidate, content })
            })
            .transpose()
    }

    /// Gate and upload a candidate under a fresh key, leaving the superseded
    /// object in place. Absent candidate returns `current_key` unchanged.
    pub async fn upload(
        &self,
        candidate: Option<UploadCandidate>,
        current_key: Option<&str>,
        slot: &SlotPolicy,
        validator: &dyn ContentValidator,
    ) -> Result<Replacement> {
        let checked = self.gate(candidate, slot, validator)?;
        self.upload_checked(checked, current_key, slot).await
    }

    /// Upload a candidate that already passed [`gate`](Self::gate).
    pub async fn upload_checked(
        &self,
        checked: Option<CheckedUpload>,
        current_key: Option<&str>,
        slot: &SlotPolicy,
    ) -> Result<Replacement> {
        let Some(CheckedUpload { candidate, content }) = checked else {
            return Ok(Replacement::unchanged(current_key));
        };
        let start = Instant::now();

        let key = generate_object_key(&self.namespace, &slot.prefix, candidate.filename.as_deref());
        let options = PutOptions {
            content_type: content.mime_type.clone(),
            acl: ObjectAcl::PublicRead,
            cache_control: self.cache_control.clone(),
        };
        let size = candidate.data.len();

        self.store
            .put(&key, candidate.data, &options)
            .await
            .map_err(|e| match e {
                Error::UploadFailed(msg) => Error::UploadFailed(msg),
                other => Error::UploadFailed(other.to_string()),
            })?;

        info!(
            subsystem = "attachments",
            component = "replacer",
            op = "put",
            slot = %slot.prefix,
            storage_key = %key,
            content_type = %content.mime_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Uploaded attachment"
        );

        Ok(Replacement {
            key: Some(key),
            uploaded: true,
            superseded: current_key.map(str::to_string),
            cleanup: CleanupOutcome::NotNeeded,
        })
    }

    /// Best-effort delete of the superseded object. Never fails, never retries.
    pub async fn cleanup(&self, replacement: &mut Replacement, slot: &SlotPolicy) {
        let Some(old_key) = replacement.superseded.as_deref() else {
            return;
        };
        replacement.cleanup = self.delete_best_effort(old_key, &slot.prefix).await;
    }

    async fn delete_best_effort(&self, key: &str, slot: &str) -> CleanupOutcome {
        match self.store.delete(key).await {
            Ok(()) => {
                debug!(
                    subsystem = "attachments",
                    component = "replacer",
                    op = "delete",
                    slot = %slot,
                    storage_key = %key,
                    "Deleted replaced attachment"
                );
                CleanupOutcome::Deleted {
                    key: key.to_string(),
                }
            }
            Err(e) => {
                warn!(
                    subsystem = "attachments",
                    component = "replacer",
                    op = "delete",
                    slot = %slot,
                    storage_key = %key,
                    error = %e,
                    "Failed to delete replaced attachment; object orphaned"
                );
                CleanupOutcome::Failed {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
