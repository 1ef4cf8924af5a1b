//! SQLite connection pool management.
//!
//! The identity store and the audit trail share one pool. File-backed
//! databases are created on first connect; in-memory databases are pinned
//! to a single long-lived connection so every query sees the same data.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

/// Default database URL for the panel.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://minepanel.db?mode=rwc";

/// How long a request waits for a pooled connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during database setup.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Open a pool against `url`, creating the database file if missing.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| DbError::InvalidUrl(format!("{url}: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    debug!(url, max_connections, "opening sqlite pool");
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open a private in-memory database (one connection, never recycled).
pub async fn connect_ephemeral() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DbError::InvalidUrl(format!("sqlite::memory:: {e}")))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open a pool and bring its schema up to date.
pub async fn connect_and_migrate(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = connect(url, max_connections).await?;
    crate::migrate::migrate(&pool).await?;
    Ok(pool)
}
