//! # rbac-entity
//!
//! Record types for the RBAC console. Every struct here is one row of
//! the remote store's `permissions`, `roles`, or `role_permissions`
//! table. Records derive `sqlx::FromRow` so the Postgres adapter maps
//! rows at the boundary and nothing untyped travels further.

pub mod assignment;
pub mod permission;
pub mod role;

pub use assignment::Assignment;
pub use permission::Permission;
pub use role::Role;

/// A record displayed and sorted by its `name`.
pub trait Named {
    /// The display name.
    fn name(&self) -> &str;

    /// The optional free-text description.
    fn description(&self) -> Option<&str>;
}

/// Trim a name and reject it when nothing is left.
pub fn normalize_name(name: &str, what: &str) -> rbac_core::AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(rbac_core::AppError::validation(format!(
            "{what} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Collapse blank descriptions to `None`.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
