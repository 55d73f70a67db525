//! `roles` table repository.

use sqlx::PgPool;

use rbac_core::result::AppResult;
use rbac_core::types::RoleId;
use rbac_core::AppError;
use rbac_entity::Role;

use super::map_sqlx_error;

/// CRUD access to the `roles` table.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All roles in byte-wise name order.
    pub async fn find_all(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles ORDER BY name COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Failed to list roles"))
    }

    /// Insert a role; the store assigns `id` and `created_at`.
    pub async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) \
             RETURNING id, name, description, created_at",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &format!("Failed to create role '{name}'")))
    }

    /// Update name and description.
    pub async fn update(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Failed to update role"))?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Delete a role. `role_permissions` rows go with it via the
    /// foreign key's `ON DELETE CASCADE`.
    pub async fn delete(&self, id: RoleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Failed to delete role"))?;
        Ok(result.rows_affected() > 0)
    }
}
