//! Error types for the home page service.

use thiserror::Error;

/// Result type alias using the service's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for home page operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Declared upload size exceeds the slot limit
    #[error("Payload too large: {size} bytes exceeds the limit of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    /// Uploaded bytes are not an accepted image
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// Object store rejected or failed the upload
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Object store operation other than upload failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("serialization: {}", e))
    }
}

impl Error {
    /// True for errors caused by the caller's input rather than a dependency.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::InvalidInput(_)
                | Error::PayloadTooLarge { .. }
                | Error::InvalidContent(_)
        )
    }
}
