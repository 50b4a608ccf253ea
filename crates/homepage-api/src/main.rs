//! Home page settings API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use homepage_api::config::AppConfig;
use homepage_api::{router, AppState, MediaMount, RouterOptions};
use homepage_core::{AttachmentReplacer, HomeSettingsService, ImageContentValidator};
use homepage_db::{log_pool_metrics, Database, PoolConfig};
use homepage_storage::{build_object_store, StorageBackendKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "homepage_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "homepage_api=debug,homepage_core=debug,homepage_db=info,homepage_storage=info,tower_http=debug"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("homepage-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // No ANSI in files unless asked for
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env()?;
    info!(
        subsystem = "api",
        app_mode = %config.app_mode,
        storage_backend = ?config.storage.backend,
        max_request_body_bytes = config.max_request_body_bytes,
        "Configuration loaded"
    );

    let db = Database::connect_with_config(
        &config.database_url,
        PoolConfig::default().max_connections(config.db_max_connections),
    )
    .await?;
    db.migrate().await?;
    log_pool_metrics(db.pool());
    info!(subsystem = "database", "Migrations applied");

    let store = build_object_store(&config.storage).await?;
    let home = HomeSettingsService::new(
        Arc::new(db.home.clone()),
        AttachmentReplacer::new(store, config.app_mode.as_str()),
        Arc::new(ImageContentValidator::new()),
    );

    let media = match config.storage.backend {
        StorageBackendKind::Filesystem => {
            config.storage.filesystem.public_path().map(|path| MediaMount {
                path,
                dir: config.storage.filesystem.base_path.clone().into(),
            })
        }
        StorageBackendKind::S3 => None,
    };

    let app = router(
        AppState::new(home),
        RouterOptions {
            max_request_body_bytes: config.max_request_body_bytes,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
            media,
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
