//! Embedded schema migrations.
//!
//! The SQL lives in `migrations/sqlite/` at the workspace root and is
//! compiled into the binary, so the API server and the `seed` tool always
//! agree on the schema. Files are append-only: a new change gets the next
//! `NNN_` prefix.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever is pending. Already-applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(embedded = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Returns `(embedded, applied)`.
///
/// A database that was never migrated has no `_sqlx_migrations` table and
/// reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let has_table: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;
    if !has_table {
        return Ok((embedded, 0));
    }

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((embedded, applied as usize))
}
