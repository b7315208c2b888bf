// File: botpulse-core/src/test_utils/helpers.rs

use std::sync::OnceLock;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tokio::sync::{Mutex, MutexGuard};

use crate::db::Database;
use crate::Error;

static DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serializes tests that share the one test database. Acquire at the top of
/// a test and hold the guard for the whole body.
pub async fn db_guard() -> MutexGuard<'static, ()> {
    DB_LOCK.get_or_init(|| Mutex::new(())).lock().await
}

/// Create a connection pool to the test DB.
/// By default looks for `TEST_DATABASE_URL` in env,
/// else uses `postgres://postgres@localhost/botpulse_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/botpulse_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            user_interactions,
            bot_configs
        RESTART IDENTITY CASCADE;
        "#,
    )
        .execute(pool)
        .await?;

    Ok(())
}

/// Returns a fully migrated, empty Database.
pub async fn setup_test_database() -> Result<Database, Error> {
    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}
