//! Singleton home page settings repository.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, warn};

use homepage_core::{Error, HomeConfig, HomeConfigChanges, HomeConfigRepository, Result};

const SELECT_COLUMNS: &str = "id, config_type, sitename, aboutus, introduction, logo_key, \
                              image_key, created_at, updated_at";

/// PostgreSQL implementation of HomeConfigRepository.
#[derive(Clone)]
pub struct PgHomeConfigRepository {
    pool: Pool<Postgres>,
}

impl PgHomeConfigRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HomeConfigRepository for PgHomeConfigRepository {
    async fn find(&self, config_type: &str) -> Result<Option<HomeConfig>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM home_config WHERE config_type = $1",
            SELECT_COLUMNS
        ))
        .bind(config_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| map_row(&r)))
    }

    async fn upsert(&self, config_type: &str, changes: HomeConfigChanges) -> Result<HomeConfig> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        match upsert_tx(&mut tx, config_type, changes).await {
            Ok((record, created)) => {
                tx.commit().await.map_err(Error::Database)?;
                debug!(
                    subsystem = "database",
                    component = "home_config",
                    op = "upsert",
                    config_type = %config_type,
                    created,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Home config committed"
                );
                Ok(record)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        subsystem = "database",
                        component = "home_config",
                        op = "rollback",
                        error = %rollback_err,
                        "Rollback failed; connection will be discarded"
                    );
                }
                debug!(
                    subsystem = "database",
                    component = "home_config",
                    op = "upsert",
                    config_type = %config_type,
                    error = %e,
                    "Home config upsert rolled back"
                );
                Err(e)
            }
        }
    }
}

/// Insert or update inside an open transaction. Returns the row and whether
/// it was created.
async fn upsert_tx(
    conn: &mut PgConnection,
    config_type: &str,
    changes: HomeConfigChanges,
) -> Result<(HomeConfig, bool)> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM home_config WHERE config_type = $1 FOR UPDATE")
            .bind(config_type)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Error::Database)?;

    if let Some(id) = existing {
        let row = sqlx::query(&format!(
            r#"
            UPDATE home_config SET
                sitename     = COALESCE($2, sitename),
                aboutus      = COALESCE($3, aboutus),
                introduction = COALESCE($4, introduction),
                logo_key     = COALESCE($5, logo_key),
                image_key    = COALESCE($6, image_key),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(changes.sitename)
        .bind(changes.aboutus)
        .bind(changes.introduction)
        .bind(changes.logo_key)
        .bind(changes.image_key)
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Database)?;
        return Ok((map_row(&row), false));
    }

    let sitename = changes.sitename.ok_or_else(|| {
        Error::InvalidInput("sitename is required when creating home settings".to_string())
    })?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO home_config (config_type, sitename, aboutus, introduction, logo_key, image_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        SELECT_COLUMNS
    ))
    .bind(config_type)
    .bind(sitename)
    .bind(changes.aboutus)
    .bind(changes.introduction)
    .bind(changes.logo_key)
    .bind(changes.image_key)
    .fetch_one(&mut *conn)
    .await
    .map_err(Error::Database)?;

    Ok((map_row(&row), true))
}

fn map_row(r: &PgRow) -> HomeConfig {
    HomeConfig {
        id: r.get("id"),
        config_type: r.get("config_type"),
        sitename: r.get("sitename"),
        aboutus: r.get("aboutus"),
        introduction: r.get("introduction"),
        logo_key: r.get("logo_key"),
        image_key: r.get("image_key"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
