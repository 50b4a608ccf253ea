//! Structured logging schema and field name constants.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation tools can query every subsystem the same way.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, e.g. an orphaned object left behind |
//! | INFO  | Lifecycle events (startup, shutdown), completed uploads and upserts |
//! | DEBUG | Decision points, rejected client input |
//! | TRACE | High-volume data (multipart chunks) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "attachments", "database", "storage"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "replacer", "pool", "s3", "filesystem", "home"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "replace", "put", "delete", "upsert"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Object store key being written or removed.
pub const STORAGE_KEY: &str = "storage_key";

/// Key prefix of the attachment slot ("home/logo", "home/hero").
pub const SLOT: &str = "slot";

/// Singleton marker of the configuration row.
pub const CONFIG_TYPE: &str = "config_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Size of an uploaded payload in bytes.
pub const SIZE_BYTES: &str = "size_bytes";

/// Detected MIME type of an upload.
pub const CONTENT_TYPE: &str = "content_type";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
