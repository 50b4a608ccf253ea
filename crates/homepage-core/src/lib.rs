//! # homepage-core
//!
//! Core types, traits, and the attachment replacement workflow for the home
//! page settings service.
//!
//! Storage and database backends live in `homepage-storage` and `homepage-db`;
//! this crate only defines the seams they plug into.

pub mod attachments;
pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod home;
pub mod keys;
pub mod logging;
pub mod models;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types at crate root
pub use attachments::{AttachmentReplacer, CheckedUpload, CleanupOutcome, Replacement, SlotPolicy};
pub use error::{Error, Result};
pub use file_safety::{detect_image_format, sanitize_filename, ImageContentValidator};
pub use home::HomeSettingsService;
pub use keys::generate_object_key;
pub use models::*;
pub use traits::*;
