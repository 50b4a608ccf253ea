//! # homepage-db
//!
//! PostgreSQL storage for the home page settings record.
//!
//! This crate provides:
//! - Connection pool management
//! - `PgHomeConfigRepository`, the transactional singleton upsert
//! - The bootstrap migration (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use homepage_db::Database;
//! use homepage_core::{HomeConfigRepository, defaults::MAIN_CONFIG_TYPE};
//!
//! let db = Database::connect("postgres://localhost/homepage").await?;
//! let current = db.home.find(MAIN_CONFIG_TYPE).await?;
//! ```

pub mod home;
pub mod pool;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

pub use homepage_core::{Error, Result};

pub use home::PgHomeConfigRepository;
pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, PoolConfig, DEFAULT_MAX_CONNECTIONS,
};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Singleton home settings repository.
    pub home: PgHomeConfigRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            home: PgHomeConfigRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with the default pool configuration.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
