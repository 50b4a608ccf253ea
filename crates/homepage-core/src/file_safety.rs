//! Image content validation and filename hygiene.
//!
//! Uploaded images are accepted on the strength of their bytes only:
//! 1. Magic byte detection (`infer`) against the allowed format list
//! 2. Header decode (`image`) to prove the signature is followed by a real image
//! 3. Dimension bounds
//!
//! The client-supplied filename extension and content type are never trusted.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use tracing::debug;

use crate::defaults::MAX_IMAGE_DIMENSION;
use crate::error::{Error, Result};
use crate::models::UploadCandidate;
use crate::traits::{ContentValidator, ValidatedContent};

/// MIME types accepted for attachment slots, with their decoder format.
pub const ALLOWED_IMAGE_TYPES: &[(&str, ImageFormat)] = &[
    ("image/jpeg", ImageFormat::Jpeg),
    ("image/png", ImageFormat::Png),
    ("image/gif", ImageFormat::Gif),
    ("image/webp", ImageFormat::WebP),
];

/// Validator accepting JPEG, PNG, GIF and WebP images.
#[derive(Debug, Clone)]
pub struct ImageContentValidator {
    max_dimension: u32,
}

impl Default for ImageContentValidator {
    fn default() -> Self {
        Self {
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }
}

impl ImageContentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest accepted width or height.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

impl ContentValidator for ImageContentValidator {
    fn validate(&self, candidate: &UploadCandidate) -> Result<ValidatedContent> {
        let data = &candidate.data[..];
        if data.is_empty() {
            return Err(Error::InvalidContent("file is empty".to_string()));
        }

        let (mime_type, format) = detect_image_format(data).ok_or_else(|| {
            Error::InvalidContent(
                "file content is not a JPEG, PNG, GIF or WebP image".to_string(),
            )
        })?;

        if let Some(claimed) = candidate.declared_content_type.as_deref() {
            if !claimed.eq_ignore_ascii_case(mime_type) {
                debug!(
                    subsystem = "attachments",
                    component = "validator",
                    claimed = %claimed,
                    detected = %mime_type,
                    "Declared content type differs from detected type"
                );
            }
        }

        let (width, height) = ImageReader::with_format(Cursor::new(data), format)
            .into_dimensions()
            .map_err(|e| {
                Error::InvalidContent(format!("corrupt {} image: {}", mime_type, e))
            })?;

        if width == 0 || height == 0 {
            return Err(Error::InvalidContent("image has no pixels".to_string()));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(Error::InvalidContent(format!(
                "image is {}x{} pixels; the limit is {} on either side",
                width, height, self.max_dimension
            )));
        }

        Ok(ValidatedContent {
            mime_type: mime_type.to_string(),
            width,
            height,
        })
    }
}

/// Detect an allowed image format from magic bytes.
pub fn detect_image_format(data: &[u8]) -> Option<(&'static str, ImageFormat)> {
    let kind = infer::get(data)?;
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == kind.mime_type())
        .copied()
}

/// Sanitize filename for safe use inside object keys.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    // Truncate if too long (preserve extension)
    if sanitized.len() > 255 {
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            if ext.len() < 255 {
                let name = truncate_at_char_boundary(&sanitized[..dot_pos], 255 - ext.len());
                return format!("{}{}", name, ext);
            }
        }
        return truncate_at_char_boundary(sanitized, 255).to_string();
    }

    sanitized.to_string()
}

fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
