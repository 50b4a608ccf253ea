//! Home page settings endpoints.
//!
//! `POST /api/v1/home/setup` takes `multipart/form-data`:
//! - `sitename`, `aboutus`, `introduction`: text, each optional on update;
//!   an empty `aboutus` or `introduction` counts as absent
//! - `logo`, `hero_image`: image files, each optional
//!
//! File parts are read chunk by chunk and dropped as soon as they pass the
//! slot limit, so an oversized upload never sits fully in memory.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::BytesMut;
use tracing::{debug, trace};
use utoipa::ToSchema;

use homepage_core::{Error, HomeSetupRequest, HomeView, SlotPolicy, UploadCandidate};

use crate::{ApiError, AppState};

/// Multipart form accepted by the setup endpoint (documentation only).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct HomeSetupForm {
    /// Site name, 1-120 characters. Required on first setup.
    sitename: Option<String>,
    /// About-us text, at most 2000 characters.
    aboutus: Option<String>,
    /// Introduction text, at most 1200 characters.
    introduction: Option<String>,
    /// Logo image (JPEG, PNG, GIF or WebP).
    #[schema(value_type = Option<String>, format = Binary)]
    logo: Option<Vec<u8>>,
    /// Hero image (JPEG, PNG, GIF or WebP).
    #[schema(value_type = Option<String>, format = Binary)]
    hero_image: Option<Vec<u8>>,
}

/// Create or update the home page settings.
#[utoipa::path(post, path = "/api/v1/home/setup", tag = "Home",
    request_body(content = HomeSetupForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Settings saved", body = HomeView),
        (status = 400, description = "Invalid text field or form", body = ErrorBody),
        (status = 413, description = "Image exceeds the slot limit", body = ErrorBody),
        (status = 415, description = "File is not an accepted image", body = ErrorBody),
        (status = 502, description = "Object storage rejected the upload", body = ErrorBody),
    ))]
pub async fn setup_home(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<HomeView>), ApiError> {
    let mut request = HomeSetupRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("sitename") => request.sitename = Some(field.text().await?),
            Some("aboutus") => request.aboutus = non_empty(field.text().await?),
            Some("introduction") => request.introduction = non_empty(field.text().await?),
            Some("logo") => {
                request.logo = read_upload(field, state.home.logo_slot()).await?;
            }
            Some("hero_image") => {
                request.hero_image = read_upload(field, state.home.hero_slot()).await?;
            }
            other => {
                debug!(subsystem = "api", field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let view = state.home.setup(request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Current home page settings.
#[utoipa::path(get, path = "/api/v1/home", tag = "Home",
    responses(
        (status = 200, description = "Current settings", body = HomeView),
        (status = 404, description = "Not configured yet", body = ErrorBody),
    ))]
pub async fn get_home(State(state): State<AppState>) -> Result<Json<HomeView>, ApiError> {
    Ok(Json(state.home.current().await?))
}

/// An untouched textarea submits an empty string; treat it as absent so the
/// stored text is kept.
fn non_empty(text: String) -> Option<String> {
    Some(text).filter(|t| !t.is_empty())
}

/// Read one file part, enforcing the slot limit while streaming.
///
/// A part with no filename and no bytes is what browsers send for an empty
/// file input; it counts as "no file".
async fn read_upload(
    mut field: Field<'_>,
    slot: &SlotPolicy,
) -> Result<Option<UploadCandidate>, ApiError> {
    let filename = field
        .file_name()
        .map(|f| f.to_string())
        .filter(|f| !f.is_empty());
    let content_type = field.content_type().map(|c| c.to_string());

    let mut data = BytesMut::new();
    let mut total: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        total += chunk.len() as u64;
        trace!(
            subsystem = "api",
            slot = %slot.prefix,
            chunk_size = chunk.len(),
            total_size = total,
            "Read upload chunk"
        );
        if total > slot.max_size {
            return Err(Error::PayloadTooLarge {
                size: total,
                max: slot.max_size,
            }
            .into());
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() && filename.is_none() {
        return Ok(None);
    }
    Ok(Some(UploadCandidate::new(
        filename,
        content_type,
        data.freeze(),
    )))
}
