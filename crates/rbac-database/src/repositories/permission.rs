//! `permissions` table repository.

use sqlx::PgPool;

use rbac_core::result::AppResult;
use rbac_core::types::PermissionId;
use rbac_core::AppError;
use rbac_entity::Permission;

use super::map_sqlx_error;

/// CRUD access to the `permissions` table.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All permissions in byte-wise name order.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, name, description, created_at FROM permissions ORDER BY name COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Failed to list permissions"))
    }

    /// Insert a permission; the store assigns `id` and `created_at`.
    pub async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name, description) VALUES ($1, $2) \
             RETURNING id, name, description, created_at",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &format!("Failed to create permission '{name}'")))
    }

    /// Update name and description.
    pub async fn update(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Failed to update permission"))?
        .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
    }

    /// Delete a permission. `role_permissions` rows go with it via the
    /// foreign key's `ON DELETE CASCADE`.
    pub async fn delete(&self, id: PermissionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Failed to delete permission"))?;
        Ok(result.rows_affected() > 0)
    }
}
