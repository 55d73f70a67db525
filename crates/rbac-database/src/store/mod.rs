//! The remote-store contract consumed by the cache layer.
//!
//! [`RbacStore`] is the generic query/insert/update/delete client over the
//! `permissions`, `roles`, and `role_permissions` tables. Implementations
//! must generate unique ids on insert, reject a duplicate
//! `(role_id, permission_id)` pair with [`ErrorKind::AlreadyAssigned`](rbac_core::ErrorKind::AlreadyAssigned),
//! and cascade link deletion when a role or permission row is deleted.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use rbac_core::config::DatabaseConfig;
use rbac_core::result::AppResult;
use rbac_core::types::{PermissionId, RoleId};
use rbac_entity::{Assignment, Permission, Role};

pub use memory::MemoryRbacStore;
pub use postgres::PgRbacStore;

use crate::connection::DatabasePool;

/// URL scheme selecting the in-process store.
pub const MEMORY_URL_SCHEME: &str = "memory:";

/// Trait for remote RBAC stores (PostgreSQL or in-memory).
#[async_trait]
pub trait RbacStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read every permission row.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Read every role row.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Read every link row.
    async fn list_assignments(&self) -> AppResult<Vec<Assignment>>;

    /// Insert a permission and return the stored row.
    async fn insert_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission>;

    /// Update a permission's name and description.
    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission>;

    /// Delete a permission and, by cascade, its links. Returns `false`
    /// when no row matched.
    async fn delete_permission(&self, id: PermissionId) -> AppResult<bool>;

    /// Insert a role and return the stored row.
    async fn insert_role(&self, name: &str, description: Option<&str>) -> AppResult<Role>;

    /// Update a role's name and description.
    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role>;

    /// Delete a role and, by cascade, its links. Returns `false` when no
    /// row matched.
    async fn delete_role(&self, id: RoleId) -> AppResult<bool>;

    /// Insert a link row.
    async fn insert_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment>;

    /// Delete the link row for this pair; returns rows removed.
    async fn delete_assignment(&self, role_id: RoleId, permission_id: PermissionId)
    -> AppResult<u64>;

    /// Check store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Open the store selected by `config.url`.
///
/// A `memory:` URL yields an empty [`MemoryRbacStore`]; anything else is
/// treated as a PostgreSQL connection string.
pub async fn open_store(config: &DatabaseConfig) -> AppResult<Arc<dyn RbacStore>> {
    if config.url.starts_with(MEMORY_URL_SCHEME) {
        tracing::info!("Using in-memory RBAC store");
        return Ok(Arc::new(MemoryRbacStore::new()));
    }
    let db = DatabasePool::connect(config).await?;
    Ok(Arc::new(PgRbacStore::new(db)))
}
