//! # homepage-api
//!
//! HTTP surface of the home page settings service.
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/api/v1/home/setup` | Create or update settings (multipart) |
//! | GET | `/api/v1/home` | Current settings with resolved image URLs |
//! | GET | `/health` | Liveness |
//! | GET | `/openapi.json` | OpenAPI document |

pub mod config;
pub mod handlers;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use utoipa::OpenApi;

use homepage_core::defaults::MAX_REQUEST_BODY_BYTES;
use homepage_core::HomeSettingsService;

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    pub home: HomeSettingsService,
}

impl AppState {
    pub fn new(home: HomeSettingsService) -> Self {
        Self { home }
    }
}

/// Local directory served read-only under a URL path.
#[derive(Debug, Clone)]
pub struct MediaMount {
    /// Route prefix, e.g. `/media`.
    pub path: String,
    pub dir: PathBuf,
}

/// Router-level limits, CORS policy and the optional media mount.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_request_body_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    /// Set in filesystem-backend mode so returned image URLs resolve.
    pub media: Option<MediaMount>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_request_body_bytes: MAX_REQUEST_BODY_BYTES,
            cors_allowed_origins: Vec::new(),
            media: None,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Home Page Settings API",
        description = "Singleton home page configuration with logo and hero image attachments"
    ),
    paths(
        handlers::home::setup_home,
        handlers::home::get_home,
        handlers::system::health_check,
    ),
    components(schemas(homepage_core::HomeView, handlers::home::HomeSetupForm, ErrorBody)),
    tags(
        (name = "Home", description = "Home page settings"),
        (name = "System", description = "Health checks and API metadata"),
    )
)]
pub struct ApiDoc;

/// Build the application router.
pub fn router(state: AppState, options: RouterOptions) -> Router {
    let origins: Vec<HeaderValue> = options
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let mut app = Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/openapi.json", get(handlers::system::openapi_json))
        .route("/api/v1/home", get(handlers::home::get_home))
        .route("/api/v1/home/setup", post(handlers::home::setup_home));

    if let Some(media) = &options.media {
        debug!(
            subsystem = "api",
            path = %media.path,
            dir = %media.dir.display(),
            "Serving local media directory"
        );
        app = app.nest_service(&media.path, ServeDir::new(&media.dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        // Multipart handlers enforce per-slot limits; the router caps the whole body
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(options.max_request_body_bytes))
        .with_state(state)
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON error body returned by every failing endpoint.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error, mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    BadGateway(String),
    Internal(homepage_core::Error),
}

impl From<homepage_core::Error> for ApiError {
    fn from(err: homepage_core::Error) -> Self {
        use homepage_core::Error;
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            e @ Error::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            Error::InvalidContent(msg) => ApiError::UnsupportedMediaType(msg),
            Error::UploadFailed(msg) => ApiError::BadGateway(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("Multipart error: {}", err.body_text()))
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::BadGateway(msg) => msg,
            ApiError::Internal(err) => err.to_string(),
        };

        if status.is_server_error() {
            error!(
                subsystem = "api",
                status = status.as_u16(),
                error = %message,
                "Request failed"
            );
        } else {
            debug!(
                subsystem = "api",
                status = status.as_u16(),
                error = %message,
                "Request rejected"
            );
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homepage_core::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                Error::PayloadTooLarge { size: 2, max: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (Error::InvalidContent("x".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (Error::UploadFailed("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/home/setup"));
        assert!(doc.paths.paths.contains_key("/api/v1/home"));
    }
}
