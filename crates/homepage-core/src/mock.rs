//! In-memory collaborators for deterministic testing.
//!
//! Available in this crate's unit tests and to other crates through the
//! `mock` feature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use homepage_core::mock::{MockObjectStore, InMemoryHomeConfigRepository};
//!
//! let store = MockObjectStore::new().failing_deletes();
//! let repo = InMemoryHomeConfigRepository::new();
//! // ... run the workflow, then inspect store.calls()
//! ```

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::models::{HomeConfig, HomeConfigChanges};
use crate::traits::{HomeConfigRepository, ObjectStore, PutOptions};

/// One recorded object store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put {
        key: String,
        size: usize,
        options: PutOptions,
    },
    Delete {
        key: String,
    },
}

#[derive(Debug, Default)]
struct StoreState {
    objects: HashMap<String, Bytes>,
    calls: Vec<StoreCall>,
    fail_puts: bool,
    fail_deletes: bool,
}

/// Object store that keeps objects in memory and records every call.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` fail.
    pub fn failing_puts(self) -> Self {
        self.lock().fail_puts = true;
        self
    }

    /// Make every `delete` fail.
    pub fn failing_deletes(self) -> Self {
        self.lock().fail_deletes = true;
        self
    }

    /// Seed an object without recording a call.
    pub fn insert(&self, key: &str, data: impl Into<Bytes>) {
        self.lock().objects.insert(key.to_string(), data.into());
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn delete_count(&self, key: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Delete { key: k } if k == key))
            .count()
    }

    pub fn put_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Put { .. }))
            .count()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().objects.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.lock().objects.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Put {
            key: key.to_string(),
            size: data.len(),
            options: options.clone(),
        });
        if state.fail_puts {
            return Err(Error::UploadFailed("mock store rejects uploads".to_string()));
        }
        state.objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Delete {
            key: key.to_string(),
        });
        if state.fail_deletes {
            return Err(Error::Storage("mock store rejects deletes".to_string()));
        }
        state.objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://mock.invalid/{}", key)
    }
}

#[derive(Debug, Default)]
struct RepoState {
    rows: HashMap<String, HomeConfig>,
    next_id: i64,
    fail_upserts: bool,
}

/// Singleton repository backed by a map, with the same insert/update rules
/// as the PostgreSQL implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHomeConfigRepository {
    state: Arc<Mutex<RepoState>>,
}

impl InMemoryHomeConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `upsert` fail as if the transaction rolled back.
    pub fn failing_upserts(self) -> Self {
        self.lock().fail_upserts = true;
        self
    }

    /// Number of stored rows (the singleton invariant keeps this at most 1 per marker).
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, RepoState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HomeConfigRepository for InMemoryHomeConfigRepository {
    async fn find(&self, config_type: &str) -> Result<Option<HomeConfig>> {
        Ok(self.lock().rows.get(config_type).cloned())
    }

    async fn upsert(&self, config_type: &str, changes: HomeConfigChanges) -> Result<HomeConfig> {
        let mut state = self.lock();
        if state.fail_upserts {
            return Err(Error::Internal("mock repository rolled back".to_string()));
        }
        let now = Utc::now();
        if let Some(row) = state.rows.get_mut(config_type) {
            row.apply(changes, now);
            return Ok(row.clone());
        }
        let mut row = HomeConfig::from_changes(changes, now)?;
        state.next_id += 1;
        row.id = state.next_id;
        row.config_type = config_type.to_string();
        state.rows.insert(config_type.to_string(), row.clone());
        Ok(row)
    }
}

/// Encode a solid-colour PNG of the given size.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    encode_sample(width, height, ImageFormat::Png)
}

/// Encode a solid-colour JPEG of the given size.
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_sample(width, height, ImageFormat::Jpeg)
}

fn encode_sample(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .expect("encoding an in-memory sample image cannot fail");
    buf.into_inner()
}
