//! Durable storage for the eCourts tracker.
//!
//! Exposes the [`KeyValueStore`](store::KeyValueStore) abstraction with its
//! SQLite and in-memory backends, pool setup, and the saved-case repository.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod repositories;
pub mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore};

pub type DbPool = sqlx::SqlitePool;

/// Errors raised by storage backends.
///
/// Repositories log and swallow these; they are surfaced only by the
/// backends themselves and by startup helpers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded writing '{key}'")]
    QuotaExceeded { key: String },
}

/// Create a connection pool from a database URL.
///
/// The database file is created if missing. In-memory databases are limited
/// to a single connection because each SQLite connection would otherwise get
/// its own private database.
pub async fn create_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        5
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Verify the pool can execute a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
