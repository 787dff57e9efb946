mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("clothica.db");

    info!("Initializing database at {}", db_path.display());

    // WAL for better concurrency; foreign keys are per-connection so they
    // belong in the connect options, not a one-off PRAGMA
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Create an in-memory database with the full schema. Test helper.
#[doc(hidden)]
pub async fn init_in_memory() -> Result<DbPool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    // A single connection: every pooled connection would otherwise get its
    // own empty in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // raw_sql executes whole scripts, including triggers with inner statements
    sqlx::raw_sql(include_str!("../../migrations/001_initial.sql"))
        .execute(pool)
        .await?;
    sqlx::raw_sql(include_str!("../../migrations/002_goods_fts.sql"))
        .execute(pool)
        .await?;

    info!("Migrations completed");
    Ok(())
}
