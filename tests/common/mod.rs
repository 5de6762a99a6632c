//! Shared test helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use levelup::db::{Database, Objective};

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Connect to the test database, apply the schema and empty every table.
pub async fn setup_test_db() -> Database {
    let db = Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to apply schema");
    truncate_all_tables(&db).await;
    db
}

/// Build an Axum test app router connected to the test database.
pub async fn build_test_app() -> axum::Router {
    let db = setup_test_db().await;
    let state = levelup::dashboard::AppState::with_db(db);
    levelup::dashboard::build_router(state, None)
}

/// Truncate all tables to ensure test isolation.
pub async fn truncate_all_tables(db: &Database) {
    sqlx::raw_sql("TRUNCATE TABLE stats, objectives RESTART IDENTITY")
        .execute(db.pool())
        .await
        .unwrap();
}

/// Insert an objective with an explicit creation time, bypassing the
/// store's `NOW()` default.
pub async fn insert_objective_at(db: &Database, text: &str, created_at: DateTime<Utc>) -> Objective {
    sqlx::query_as::<_, Objective>(
        "INSERT INTO objectives (text, created_at) VALUES ($1, $2)
         RETURNING id, text, completed, created_at",
    )
    .bind(text)
    .bind(created_at)
    .fetch_one(db.pool())
    .await
    .unwrap()
}

/// Number of rows currently in the stats table.
pub async fn stats_row_count(db: &Database) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stats")
        .fetch_one(db.pool())
        .await
        .unwrap()
}
