//! Database connection pool
//!
//! Single-database deployment: SQLite via sqlx. The factory handles both
//! file paths and `sqlite:` URLs, creating parent directories and the
//! database file as needed.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
///
/// Accepts `:memory:`, plain file paths, and `sqlite:` URLs. File-based
/// databases are created if missing (`mode=rwc`), along with their parent
/// directories.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    connect(&config.url).await
}

async fn connect(url: &str) -> Result<SqlitePool> {
    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = if url.starts_with("sqlite:") {
            url.trim_start_matches("sqlite:")
        } else {
            url
        };

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        // Already has options? Leave it alone.
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create an in-memory database pool for testing.
pub async fn create_test_pool() -> Result<SqlitePool> {
    connect(":memory:").await
}
