//! SQLite pool construction and the embedded migration runner.
//!
//! The schema ships inside the binary (`include_str!`) so `--migrate` works
//! from any working directory and integration tests can build a fresh
//! in-memory database with the exact production schema.

use anyhow::Result;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;

const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open a connection pool against `database_url`.
pub async fn connect(database_url: &str) -> Result<Arc<SqlitePool>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

/// Run the embedded schema statements one by one.
///
/// Every statement is `IF NOT EXISTS`, so re-running is harmless.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
