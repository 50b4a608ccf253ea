//! Home page settings service: the singleton upsert around two attachment slots.
//!
//! Both slots are gated (size, content) before anything is uploaded, and
//! superseded objects are deleted only after the row commits, so a failure in
//! one slot never leaves the row pointing at a deleted object. A rollback does
//! not undo the uploads: a failed commit can leave new objects unreferenced.
//! Concurrent setups race on read-modify-write; the last commit wins.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::attachments::{AttachmentReplacer, Replacement, SlotPolicy};
use crate::defaults::MAIN_CONFIG_TYPE;
use crate::error::{Error, Result};
use crate::models::{HomeConfig, HomeConfigChanges, HomeSetupRequest, HomeView};
use crate::traits::{ContentValidator, HomeConfigRepository};

/// Orchestrates configuration reads and writes for the `MAIN` row.
#[derive(Clone)]
pub struct HomeSettingsService {
    repo: Arc<dyn HomeConfigRepository>,
    replacer: AttachmentReplacer,
    validator: Arc<dyn ContentValidator>,
    logo_slot: SlotPolicy,
    hero_slot: SlotPolicy,
}

impl HomeSettingsService {
    pub fn new(
        repo: Arc<dyn HomeConfigRepository>,
        replacer: AttachmentReplacer,
        validator: Arc<dyn ContentValidator>,
    ) -> Self {
        Self {
            repo,
            replacer,
            validator,
            logo_slot: SlotPolicy::logo(),
            hero_slot: SlotPolicy::hero(),
        }
    }

    /// Override the slot policies (prefixes and size limits).
    pub fn with_slots(mut self, logo: SlotPolicy, hero: SlotPolicy) -> Self {
        self.logo_slot = logo;
        self.hero_slot = hero;
        self
    }

    pub fn logo_slot(&self) -> &SlotPolicy {
        &self.logo_slot
    }

    pub fn hero_slot(&self) -> &SlotPolicy {
        &self.hero_slot
    }

    /// Create or partially update the home settings.
    pub async fn setup(&self, mut request: HomeSetupRequest) -> Result<HomeView> {
        let start = Instant::now();
        request.validate()?;

        let current = self.repo.find(MAIN_CONFIG_TYPE).await?;
        if current.is_none() && request.sitename.is_none() {
            return Err(Error::InvalidInput(
                "sitename is required when creating home settings".to_string(),
            ));
        }

        // Gate both slots before uploading either, so a rejected hero image
        // cannot leave a freshly uploaded logo behind.
        let validator = self.validator.as_ref();
        let logo_checked = self.replacer.gate(request.logo.take(), &self.logo_slot, validator)?;
        let hero_checked = self
            .replacer
            .gate(request.hero_image.take(), &self.hero_slot, validator)?;

        let mut logo = self
            .replacer
            .upload_checked(
                logo_checked,
                current.as_ref().and_then(|c| c.logo_key.as_deref()),
                &self.logo_slot,
            )
            .await?;

        let mut hero = match self
            .replacer
            .upload_checked(
                hero_checked,
                current.as_ref().and_then(|c| c.image_key.as_deref()),
                &self.hero_slot,
            )
            .await
        {
            Ok(hero) => hero,
            Err(e) => {
                log_orphans(&[&logo], &e);
                return Err(e);
            }
        };

        let changes = HomeConfigChanges {
            sitename: request.sitename,
            aboutus: request.aboutus,
            introduction: request.introduction,
            logo_key: logo.new_key().map(str::to_string),
            image_key: hero.new_key().map(str::to_string),
        };

        let record = match self.repo.upsert(MAIN_CONFIG_TYPE, changes).await {
            Ok(record) => record,
            Err(e) => {
                log_orphans(&[&logo, &hero], &e);
                return Err(e);
            }
        };

        // The row now points at the new keys; superseded objects can go.
        self.replacer.cleanup(&mut logo, &self.logo_slot).await;
        self.replacer.cleanup(&mut hero, &self.hero_slot).await;

        info!(
            subsystem = "api",
            component = "home",
            op = "upsert",
            config_type = MAIN_CONFIG_TYPE,
            created = current.is_none(),
            logo_replaced = logo.uploaded,
            hero_replaced = hero.uploaded,
            cleanup_failures = [&logo, &hero].iter().filter(|r| r.cleanup.is_failed()).count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Home settings saved"
        );

        Ok(self.view(&record))
    }

    /// Current home settings, or `NotFound` before the first setup.
    pub async fn current(&self) -> Result<HomeView> {
        let record = self
            .repo
            .find(MAIN_CONFIG_TYPE)
            .await?
            .ok_or_else(|| Error::NotFound("Home page settings not yet configured".to_string()))?;
        Ok(self.view(&record))
    }

    fn view(&self, record: &HomeConfig) -> HomeView {
        HomeView {
            sitename: record.sitename.clone(),
            aboutus: record.aboutus.clone(),
            introduction: record.introduction.clone(),
            logo_url: self.replacer.public_url(record.logo_key.as_deref()),
            image_url: self.replacer.public_url(record.image_key.as_deref()),
        }
    }
}

fn log_orphans(replacements: &[&Replacement], cause: &Error) {
    for key in replacements.iter().filter_map(|r| r.new_key()) {
        warn!(
            subsystem = "api",
            component = "home",
            op = "upsert",
            storage_key = %key,
            error = %cause,
            "Home settings not saved; uploaded object left unreferenced"
        );
    }
}
