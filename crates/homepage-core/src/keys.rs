//! Object key generation.
//!
//! Key format: `{namespace}/{slot_prefix}/{stem-slug}-{8-hex}.{ext}`
//!
//! Example: `production/home/logo/acme-logo-3f9a0c1d.png`

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{DEFAULT_IMAGE_EXTENSION, KEY_STEM_MAX_LEN, KEY_SUFFIX_LEN};
use crate::file_safety::sanitize_filename;

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"));

/// Generate a fresh object key for an upload.
///
/// Every call yields a new key, even for the same filename: objects are never
/// overwritten, which is what allows the long-lived cache headers.
pub fn generate_object_key(namespace: &str, slot_prefix: &str, filename: Option<&str>) -> String {
    let (stem, ext) = split_filename(filename.unwrap_or(""));
    let suffix = random_suffix();

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    for part in [namespace, slot_prefix] {
        let part = part.trim_matches('/');
        if !part.is_empty() {
            parts.push(part);
        }
    }
    let name = format!("{}-{}.{}", stem, suffix, ext);
    parts.push(&name);
    parts.join("/")
}

/// Split a client filename into a key-safe stem slug and lowercase extension.
pub fn split_filename(filename: &str) -> (String, String) {
    let sanitized = sanitize_filename(filename);
    let path = Path::new(&sanitized);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    (slugify(stem), ext)
}

/// Lowercase ASCII slug: runs of anything else collapse to a single `-`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > KEY_STEM_MAX_LEN {
        slug.truncate(KEY_STEM_MAX_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    if slug.is_empty() || slug == "unnamed-file" {
        return "file".to_string();
    }
    slug
}

fn random_suffix() -> String {
    let value: u64 = rand::random();
    let hex = format!("{:016x}", value);
    hex[..KEY_SUFFIX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = generate_object_key("production", "home/logo", Some("Acme Logo.PNG"));
        assert!(key.starts_with("production/home/logo/acme-logo-"), "{}", key);
        assert!(key.ends_with(".png"));

        let name = key.rsplit('/').next().unwrap();
        let suffix = name
            .trim_start_matches("acme-logo-")
            .trim_end_matches(".png");
        assert_eq!(suffix.len(), KEY_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_filename_yields_distinct_keys() {
        let a = generate_object_key("production", "home/logo", Some("logo.png"));
        let b = generate_object_key("production", "home/logo", Some("logo.png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_extension_defaults_to_jpg() {
        let key = generate_object_key("testing", "home/hero", Some("banner"));
        assert!(key.starts_with("testing/home/hero/banner-"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_missing_filename() {
        let key = generate_object_key("development", "home/hero", None);
        assert!(key.starts_with("development/home/hero/file-"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_empty_namespace_is_skipped() {
        let key = generate_object_key("", "/home/logo/", Some("x.png"));
        assert!(key.starts_with("home/logo/x-"));
    }

    #[test]
    fn test_path_components_are_stripped() {
        let key = generate_object_key("production", "home/logo", Some("../../etc/passwd.png"));
        assert!(key.starts_with("production/home/logo/passwd-"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_split_filename() {
        assert_eq!(
            split_filename("My Photo (1).JPEG"),
            ("my-photo-1".to_string(), "jpeg".to_string())
        );
        assert_eq!(split_filename("archive.tar.gz").1, "gz");
        assert_eq!(split_filename("weird.ex t").1, "jpg");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"ab-".repeat(40));
        assert!(slug.len() <= KEY_STEM_MAX_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slugify_non_ascii_only() {
        assert_eq!(slugify("日本語"), "file");
    }
}
