//! Domain models for the home page configuration.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::defaults::{
    ABOUTUS_MAX_CHARS, INTRODUCTION_MAX_CHARS, MAIN_CONFIG_TYPE, SITENAME_MAX_CHARS,
};
use crate::error::{Error, Result};

// =============================================================================
// DEPLOYMENT TIER
// =============================================================================

/// Deployment tier. Doubles as the object key namespace so tiers sharing one
/// bucket never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Development,
    #[default]
    Production,
    Testing,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }

    pub fn is_development(&self) -> bool {
        *self == Self::Development
    }
}

impl FromStr for AppMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "testing" | "test" => Ok(Self::Testing),
            other => Err(Error::Config(format!("unknown app mode: {}", other))),
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// UPLOADS
// =============================================================================

/// A file offered by a client for one attachment slot.
///
/// `declared_size` and `declared_content_type` come from the client and are
/// only used as cheap guards; the bytes in `data` are what gets validated.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub filename: Option<String>,
    pub declared_content_type: Option<String>,
    pub declared_size: u64,
    pub data: Bytes,
}

impl UploadCandidate {
    /// Build a candidate whose declared size is the length of `data`.
    pub fn new(
        filename: Option<String>,
        declared_content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            filename,
            declared_content_type,
            declared_size: data.len() as u64,
            data,
        }
    }

    /// Override the declared size (e.g. from a Content-Length header).
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = size;
        self
    }
}

// =============================================================================
// SINGLETON RECORD
// =============================================================================

/// The home page configuration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    pub id: i64,
    pub config_type: String,
    pub sitename: String,
    pub aboutus: Option<String>,
    pub introduction: Option<String>,
    pub logo_key: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field changes for the singleton row. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeConfigChanges {
    pub sitename: Option<String>,
    pub aboutus: Option<String>,
    pub introduction: Option<String>,
    pub logo_key: Option<String>,
    pub image_key: Option<String>,
}

impl HomeConfig {
    /// Build a fresh `MAIN` row from a change set. A site name is mandatory.
    pub fn from_changes(changes: HomeConfigChanges, now: DateTime<Utc>) -> Result<Self> {
        let sitename = changes.sitename.ok_or_else(|| {
            Error::InvalidInput("sitename is required when creating home settings".to_string())
        })?;
        Ok(Self {
            id: 0,
            config_type: MAIN_CONFIG_TYPE.to_string(),
            sitename,
            aboutus: changes.aboutus,
            introduction: changes.introduction,
            logo_key: changes.logo_key,
            image_key: changes.image_key,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a change set field by field.
    pub fn apply(&mut self, changes: HomeConfigChanges, now: DateTime<Utc>) {
        if let Some(sitename) = changes.sitename {
            self.sitename = sitename;
        }
        if let Some(aboutus) = changes.aboutus {
            self.aboutus = Some(aboutus);
        }
        if let Some(introduction) = changes.introduction {
            self.introduction = Some(introduction);
        }
        if let Some(logo_key) = changes.logo_key {
            self.logo_key = Some(logo_key);
        }
        if let Some(image_key) = changes.image_key {
            self.image_key = Some(image_key);
        }
        self.updated_at = now;
    }
}

/// A configuration request as received from a client.
#[derive(Debug, Clone, Default)]
pub struct HomeSetupRequest {
    pub sitename: Option<String>,
    pub aboutus: Option<String>,
    pub introduction: Option<String>,
    pub logo: Option<UploadCandidate>,
    pub hero_image: Option<UploadCandidate>,
}

impl HomeSetupRequest {
    /// Check text field lengths and trim the site name.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(sitename) = self.sitename.as_mut() {
            let trimmed = sitename.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidInput("sitename must not be empty".to_string()));
            }
            check_length("sitename", trimmed, SITENAME_MAX_CHARS)?;
            *sitename = trimmed.to_string();
        }
        if let Some(aboutus) = &self.aboutus {
            check_length("aboutus", aboutus, ABOUTUS_MAX_CHARS)?;
        }
        if let Some(introduction) = &self.introduction {
            check_length("introduction", introduction, INTRODUCTION_MAX_CHARS)?;
        }
        Ok(())
    }
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters (got {})",
            field, max_chars, len
        )));
    }
    Ok(())
}

/// Public projection of the home settings with resolved image URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HomeView {
    pub sitename: String,
    pub aboutus: Option<String>,
    pub introduction: Option<String>,
    pub logo_url: Option<String>,
    pub image_url: Option<String>,
}
