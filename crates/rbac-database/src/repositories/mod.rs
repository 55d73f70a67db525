//! Repository implementations for the three RBAC tables.

pub mod assignment;
pub mod permission;
pub mod role;

pub use assignment::AssignmentRepository;
pub use permission::PermissionRepository;
pub use role::RoleRepository;

use rbac_core::error::{AppError, ErrorKind};

/// Classify a sqlx failure by SQLSTATE.
///
/// `23505` becomes [`ErrorKind::Conflict`], `23503` becomes
/// [`ErrorKind::NotFound`] (a link to a row that no longer exists), and
/// everything else is [`ErrorKind::Database`].
pub(crate) fn map_sqlx_error(err: sqlx::Error, context: &str) -> AppError {
    let (kind, detail) = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            (ErrorKind::Conflict, db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            (ErrorKind::NotFound, db.message().to_string())
        }
        other => (ErrorKind::Database, other.to_string()),
    };
    AppError::with_source(kind, format!("{context}: {detail}"), err)
}
