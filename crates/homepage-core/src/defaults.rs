//! Centralized default constants for the home page service.
//!
//! Every crate references these constants instead of defining its own magic
//! numbers. Grouped by domain area.

// =============================================================================
// SINGLETON RECORD
// =============================================================================

/// Marker value identifying the one home configuration row.
pub const MAIN_CONFIG_TYPE: &str = "MAIN";

/// Maximum length of the site name, in characters.
pub const SITENAME_MAX_CHARS: usize = 120;

/// Maximum length of the "about us" text, in characters.
pub const ABOUTUS_MAX_CHARS: usize = 2000;

/// Maximum length of the introduction text, in characters.
pub const INTRODUCTION_MAX_CHARS: usize = 1200;

// =============================================================================
// ATTACHMENT SLOTS
// =============================================================================

/// Key prefix for the logo slot.
pub const LOGO_PREFIX: &str = "home/logo";

/// Key prefix for the hero image slot.
pub const HERO_PREFIX: &str = "home/hero";

/// Maximum logo size: 5 MiB.
pub const LOGO_MAX_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum hero image size: 8 MiB.
pub const HERO_MAX_SIZE: u64 = 8 * 1024 * 1024;

// =============================================================================
// OBJECT KEYS
// =============================================================================

/// Extension used when the uploaded filename has none.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Number of hex characters in the random key disambiguator.
pub const KEY_SUFFIX_LEN: usize = 8;

/// Maximum length of the slugified filename stem inside a key.
pub const KEY_STEM_MAX_LEN: usize = 50;

/// Keys never change content, so caches may hold them for a year.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

// =============================================================================
// IMAGE VALIDATION
// =============================================================================

/// Largest accepted width or height, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 10_000;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default cap on a whole request body (covers both image slots plus text).
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

// =============================================================================
// OBJECT STORE TIMEOUTS
// =============================================================================

/// Connect timeout for object store requests.
pub const STORAGE_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Read timeout for object store responses.
pub const STORAGE_READ_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a whole object store operation, retries included.
pub const STORAGE_OPERATION_TIMEOUT_SECS: u64 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_limit_exceeds_logo_limit() {
        assert!(HERO_MAX_SIZE > LOGO_MAX_SIZE);
    }

    #[test]
    fn test_request_body_fits_both_slots() {
        assert!(MAX_REQUEST_BODY_BYTES as u64 >= LOGO_MAX_SIZE + HERO_MAX_SIZE);
    }

    #[test]
    fn test_storage_timeouts_are_ordered() {
        assert!(STORAGE_CONNECT_TIMEOUT_SECS < STORAGE_READ_TIMEOUT_SECS);
        assert!(STORAGE_READ_TIMEOUT_SECS <= STORAGE_OPERATION_TIMEOUT_SECS);
    }
}
