//! PostgreSQL-backed [`RbacStore`].

use async_trait::async_trait;

use rbac_core::result::AppResult;
use rbac_core::types::{PermissionId, RoleId};
use rbac_entity::{Assignment, Permission, Role};

use crate::connection::DatabasePool;
use crate::repositories::{AssignmentRepository, PermissionRepository, RoleRepository};

use super::RbacStore;

/// Remote store adapter over the three table repositories.
///
/// Each call is one statement with no explicit transaction; cascade and
/// uniqueness are enforced by the schema.
#[derive(Debug, Clone)]
pub struct PgRbacStore {
    db: DatabasePool,
    permissions: PermissionRepository,
    roles: RoleRepository,
    assignments: AssignmentRepository,
}

impl PgRbacStore {
    /// Build the adapter from an open pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            permissions: PermissionRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            assignments: AssignmentRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl RbacStore for PgRbacStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.permissions.find_all().await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.find_all().await
    }

    async fn list_assignments(&self) -> AppResult<Vec<Assignment>> {
        self.assignments.find_all().await
    }

    async fn insert_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.permissions.create(name, description).await
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.permissions.update(id, name, description).await
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<bool> {
        self.permissions.delete(id).await
    }

    async fn insert_role(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        self.roles.create(name, description).await
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        self.roles.update(id, name, description).await
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<bool> {
        self.roles.delete(id).await
    }

    async fn insert_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment> {
        self.assignments.create(role_id, permission_id).await
    }

    async fn delete_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        self.assignments.delete_pair(role_id, permission_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
