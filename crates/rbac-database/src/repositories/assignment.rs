//! `role_permissions` table repository.

use sqlx::PgPool;

use rbac_core::error::{AppError, ErrorKind};
use rbac_core::result::AppResult;
use rbac_core::types::{PermissionId, RoleId};
use rbac_entity::Assignment;

use super::map_sqlx_error;

/// Access to the role-permission link table.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every link row, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            "SELECT id, role_id, permission_id, created_at FROM role_permissions \
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Failed to list role permissions"))
    }

    /// Link a permission to a role.
    ///
    /// The unique `(role_id, permission_id)` constraint surfaces as
    /// [`ErrorKind::AlreadyAssigned`] rather than a plain conflict.
    pub async fn create(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
             RETURNING id, role_id, permission_id, created_at",
        )
        .bind(role_id)
        .bind(permission_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = map_sqlx_error(e, "Failed to assign permission");
            if err.kind == ErrorKind::Conflict {
                AppError::already_assigned(format!(
                    "Permission {permission_id} is already assigned to role {role_id}"
                ))
            } else {
                err
            }
        })
    }

    /// Remove the link for this pair. Returns the number of rows removed
    /// (zero or one).
    pub async fn delete_pair(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
                .bind(role_id)
                .bind(permission_id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(e, "Failed to remove permission from role"))?;
        Ok(result.rows_affected())
    }
}
