//! Core traits for the home page service.
//!
//! These traits define the seams between the replacement workflow and its
//! collaborators, enabling pluggable backends and test doubles.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::models::{HomeConfig, HomeConfigChanges, UploadCandidate};

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Access control requested for an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

impl ObjectAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
        }
    }
}

/// Per-object upload options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    pub acl: ObjectAcl,
    pub cache_control: String,
}

/// S3-style object store.
///
/// Implementations must be safe to share across requests; the service holds
/// one instance behind an `Arc`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`.
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> Result<()>;

    /// Remove the object under `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public URL for `key`.
    fn public_url(&self, key: &str) -> String;
}

// =============================================================================
// CONTENT VALIDATION
// =============================================================================

/// Outcome of a successful content check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContent {
    /// MIME type detected from the bytes themselves.
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Inspects real file bytes and rejects anything that is not an accepted format.
pub trait ContentValidator: Send + Sync {
    fn validate(&self, candidate: &UploadCandidate) -> Result<ValidatedContent>;
}

// =============================================================================
// SINGLETON REPOSITORY
// =============================================================================

/// Relational storage of the singleton configuration row.
#[async_trait]
pub trait HomeConfigRepository: Send + Sync {
    /// Fetch the row with the given singleton marker.
    async fn find(&self, config_type: &str) -> Result<Option<HomeConfig>>;

    /// Insert or update the row with the given marker in a single transaction.
    ///
    /// Inserts when no row exists (requires `changes.sitename`), otherwise
    /// applies every `Some` field. Rolls back on any failure.
    async fn upsert(&self, config_type: &str, changes: HomeConfigChanges) -> Result<HomeConfig>;
}
