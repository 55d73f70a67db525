//! Schema migration runner.

use sqlx::PgPool;
use tracing::info;

use rbac_core::error::{AppError, ErrorKind};

/// Apply every pending migration under `migrations/` at the workspace root.
///
/// The schema carries the `ON DELETE CASCADE` foreign keys and the unique
/// `(role_id, permission_id)` constraint the cache layer relies on.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying RBAC schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("RBAC schema is up to date");
    Ok(())
}

/// One row of sqlx's migration bookkeeping table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    /// Migration version (timestamp prefix of the file name).
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// Whether the migration completed.
    pub success: bool,
}

/// List migrations already recorded in `_sqlx_migrations`, oldest first.
pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<AppliedMigration>, AppError> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to read migration history: {e}"),
            e,
        )
    })
}
