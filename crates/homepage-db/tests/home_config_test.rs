//! Integration tests for the singleton home config repository.
//!
//! Require a PostgreSQL database with the migrations applied. Run with:
//! `DATABASE_URL=... cargo test -p homepage-db -- --ignored`

use homepage_core::{Error, HomeConfigChanges, HomeConfigRepository};
use homepage_db::test_fixtures::test_database_url;
use homepage_db::Database;
use sqlx::PgPool;

/// Unique marker per test so runs do not collide on the singleton row.
fn marker(name: &str) -> String {
    format!("TEST_{}_{}", name, std::process::id())
}

async fn setup_test_db() -> Database {
    Database::connect(&test_database_url())
        .await
        .expect("Failed to connect to test database")
}

async fn cleanup(pool: &PgPool, config_type: &str) {
    sqlx::query("DELETE FROM home_config WHERE config_type = $1")
        .bind(config_type)
        .execute(pool)
        .await
        .expect("Failed to clean up test row");
}

async fn row_count(pool: &PgPool, config_type: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM home_config WHERE config_type = $1")
        .bind(config_type)
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
#[ignore]
async fn test_first_upsert_creates_row() {
    let db = setup_test_db().await;
    let config_type = marker("create");
    cleanup(&db.pool, &config_type).await;

    let record = db
        .home
        .upsert(
            &config_type,
            HomeConfigChanges {
                sitename: Some("Acme".into()),
                logo_key: Some("testing/home/logo/logo-0011aabb.png".into()),
                ..Default::default()
            },
        )
        .await
        .expect("upsert should create the row");

    assert_eq!(record.config_type, config_type);
    assert_eq!(record.sitename, "Acme");
    assert_eq!(record.logo_key.as_deref(), Some("testing/home/logo/logo-0011aabb.png"));
    assert!(record.image_key.is_none());
    assert_eq!(row_count(&db.pool, &config_type).await, 1);

    cleanup(&db.pool, &config_type).await;
}

#[tokio::test]
#[ignore]
async fn test_partial_update_keeps_absent_fields() {
    let db = setup_test_db().await;
    let config_type = marker("partial");
    cleanup(&db.pool, &config_type).await;

    let created = db
        .home
        .upsert(
            &config_type,
            HomeConfigChanges {
                sitename: Some("Acme".into()),
                aboutus: Some("Anvils since 1949".into()),
                image_key: Some("testing/home/hero/hero-0011aabb.jpg".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = db
        .home
        .upsert(
            &config_type,
            HomeConfigChanges {
                introduction: Some("Welcome".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.sitename, "Acme");
    assert_eq!(updated.aboutus.as_deref(), Some("Anvils since 1949"));
    assert_eq!(updated.introduction.as_deref(), Some("Welcome"));
    assert_eq!(updated.image_key, created.image_key);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(row_count(&db.pool, &config_type).await, 1);

    cleanup(&db.pool, &config_type).await;
}

#[tokio::test]
#[ignore]
async fn test_creation_without_sitename_rolls_back() {
    let db = setup_test_db().await;
    let config_type = marker("nositename");
    cleanup(&db.pool, &config_type).await;

    let err = db
        .home
        .upsert(
            &config_type,
            HomeConfigChanges {
                aboutus: Some("orphan text".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(row_count(&db.pool, &config_type).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_constraint_violation_leaves_row_unchanged() {
    let db = setup_test_db().await;
    let config_type = marker("constraint");
    cleanup(&db.pool, &config_type).await;

    db.home
        .upsert(
            &config_type,
            HomeConfigChanges {
                sitename: Some("Acme".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Bypasses request validation; the CHECK constraint rejects it
    let err = db
        .home
        .upsert(
            &config_type,
            HomeConfigChanges {
                sitename: Some("x".repeat(121)),
                logo_key: Some("testing/home/logo/new-0011aabb.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    let stored = db.home.find(&config_type).await.unwrap().unwrap();
    assert_eq!(stored.sitename, "Acme");
    assert!(stored.logo_key.is_none());

    cleanup(&db.pool, &config_type).await;
}

#[tokio::test]
#[ignore]
async fn test_find_missing_returns_none() {
    let db = setup_test_db().await;
    let found = db.home.find(&marker("missing")).await.unwrap();
    assert!(found.is_none());
}
