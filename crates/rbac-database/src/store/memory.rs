//! In-process [`RbacStore`] with the same constraints as the SQL schema.
//!
//! Used by tests and by `memory:` URLs for offline sessions. Names are
//! unique per table, link pairs are unique, links must reference existing
//! rows, and deleting a role or permission cascades to its links.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use rbac_core::error::AppError;
use rbac_core::result::AppResult;
use rbac_core::types::{AssignmentId, PermissionId, RoleId};
use rbac_entity::{Assignment, Permission, Role};

use super::RbacStore;

#[derive(Debug, Default)]
struct Tables {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    role_permissions: Vec<Assignment>,
}

/// In-memory store provider.
#[derive(Debug, Default)]
pub struct MemoryRbacStore {
    tables: Mutex<Tables>,
}

impl MemoryRbacStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RbacStore for MemoryRbacStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.tables.lock().await.permissions.clone())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.tables.lock().await.roles.clone())
    }

    async fn list_assignments(&self) -> AppResult<Vec<Assignment>> {
        Ok(self.tables.lock().await.role_permissions.clone())
    }

    async fn insert_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        let mut tables = self.tables.lock().await;
        if tables.permissions.iter().any(|p| p.name == name) {
            return Err(AppError::conflict(format!(
                "Permission '{name}' already exists"
            )));
        }
        let permission = Permission {
            id: PermissionId::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        let mut tables = self.tables.lock().await;
        if tables
            .permissions
            .iter()
            .any(|p| p.id != id && p.name == name)
        {
            return Err(AppError::conflict(format!(
                "Permission '{name}' already exists"
            )));
        }
        let permission = tables
            .permissions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;
        permission.name = name.to_string();
        permission.description = description.map(str::to_string);
        Ok(permission.clone())
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.permissions.len();
        tables.permissions.retain(|p| p.id != id);
        if tables.permissions.len() == before {
            return Ok(false);
        }
        tables.role_permissions.retain(|a| a.permission_id != id);
        debug!(permission_id = %id, "Deleted permission with cascade");
        Ok(true)
    }

    async fn insert_role(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        let mut tables = self.tables.lock().await;
        if tables.roles.iter().any(|r| r.name == name) {
            return Err(AppError::conflict(format!("Role '{name}' already exists")));
        }
        let role = Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        let mut tables = self.tables.lock().await;
        if tables.roles.iter().any(|r| r.id != id && r.name == name) {
            return Err(AppError::conflict(format!("Role '{name}' already exists")));
        }
        let role = tables
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
        role.name = name.to_string();
        role.description = description.map(str::to_string);
        Ok(role.clone())
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.roles.len();
        tables.roles.retain(|r| r.id != id);
        if tables.roles.len() == before {
            return Ok(false);
        }
        tables.role_permissions.retain(|a| a.role_id != id);
        debug!(role_id = %id, "Deleted role with cascade");
        Ok(true)
    }

    async fn insert_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment> {
        let mut tables = self.tables.lock().await;
        if !tables.roles.iter().any(|r| r.id == role_id) {
            return Err(AppError::not_found(format!("Role {role_id} not found")));
        }
        if !tables.permissions.iter().any(|p| p.id == permission_id) {
            return Err(AppError::not_found(format!(
                "Permission {permission_id} not found"
            )));
        }
        if tables
            .role_permissions
            .iter()
            .any(|a| a.links(role_id, permission_id))
        {
            return Err(AppError::already_assigned(format!(
                "Permission {permission_id} is already assigned to role {role_id}"
            )));
        }
        let assignment = Assignment {
            id: AssignmentId::new(),
            role_id,
            permission_id,
            created_at: Utc::now(),
        };
        tables.role_permissions.push(assignment.clone());
        Ok(assignment)
    }

    async fn delete_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.role_permissions.len();
        tables
            .role_permissions
            .retain(|a| !a.links(role_id, permission_id));
        Ok((before - tables.role_permissions.len()) as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rbac_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_duplicate_names_conflict() {
        let store = MemoryRbacStore::new();
        store.insert_role("Editor", None).await.unwrap();
        let err = store.insert_role("Editor", Some("again")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(store.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_conflicts() {
        let store = MemoryRbacStore::new();
        store.insert_permission("can_read", None).await.unwrap();
        let write = store.insert_permission("can_write", None).await.unwrap();
        let err = store
            .update_permission(write.id, "can_read", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_already_assigned() {
        let store = MemoryRbacStore::new();
        let role = store.insert_role("Editor", None).await.unwrap();
        let perm = store.insert_permission("can_edit", None).await.unwrap();
        store.insert_assignment(role.id, perm.id).await.unwrap();
        let err = store.insert_assignment(role.id, perm.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyAssigned);
        assert_eq!(store.list_assignments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_requires_existing_rows() {
        let store = MemoryRbacStore::new();
        let role = store.insert_role("Editor", None).await.unwrap();
        let err = store
            .insert_assignment(role.id, PermissionId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_cascades_links() {
        let store = MemoryRbacStore::new();
        let editor = store.insert_role("Editor", None).await.unwrap();
        let viewer = store.insert_role("Viewer", None).await.unwrap();
        let perm = store.insert_permission("can_read", None).await.unwrap();
        store.insert_assignment(editor.id, perm.id).await.unwrap();
        store.insert_assignment(viewer.id, perm.id).await.unwrap();

        assert!(store.delete_role(editor.id).await.unwrap());
        assert_eq!(store.list_assignments().await.unwrap().len(), 1);

        assert!(store.delete_permission(perm.id).await.unwrap());
        assert!(store.list_assignments().await.unwrap().is_empty());
        assert!(!store.delete_permission(perm.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_pair_affects_nothing() {
        let store = MemoryRbacStore::new();
        let removed = store
            .delete_assignment(RoleId::new(), PermissionId::new())
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
