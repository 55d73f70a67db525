//! Write-through RBAC cache.
//!
//! Every mutation is remote-first: the store call runs, and only when it
//! succeeds is the matching [`Mirror`] transformation applied. A failed
//! call leaves the mirror exactly as it was. Nothing is retried.
//!
//! Mutations are not queued. Two calls issued without awaiting the first
//! race, and the mirror reflects whichever acknowledgment lands last;
//! [`RbacCache::is_busy`] lets callers avoid that for a given id.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use rbac_core::error::{AppError, ErrorKind};
use rbac_core::result::AppResult;
use rbac_core::types::{PermissionId, RoleId};
use rbac_database::RbacStore;
use rbac_entity::{Assignment, Permission, Role, normalize_description, normalize_name};

use crate::busy::InFlight;
use crate::mirror::{Mirror, RbacSummary, RoleGrants};

/// Session-owned cache over a remote [`RbacStore`].
#[derive(Debug)]
pub struct RbacCache {
    store: Arc<dyn RbacStore>,
    mirror: RwLock<Mirror>,
    in_flight: InFlight,
}

impl RbacCache {
    /// Create a cache with an empty mirror. Call [`load`](Self::load)
    /// before reading.
    pub fn new(store: Arc<dyn RbacStore>) -> Self {
        Self {
            store,
            mirror: RwLock::new(Mirror::default()),
            in_flight: InFlight::new(),
        }
    }

    // The lock is only ever held for a pure mirror operation, never
    // across an await.
    fn read(&self) -> RwLockReadGuard<'_, Mirror> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Mirror> {
        self.mirror.write().unwrap_or_else(PoisonError::into_inner)
    }

    // The store no longer has this row, so neither may the mirror.
    fn evict_permission(&self, id: PermissionId) {
        let links = self.write().remove_permission_cascade(id);
        debug!(
            permission_id = %id,
            links_removed = links,
            "Evicted permission missing from store"
        );
    }

    fn evict_role(&self, id: RoleId) {
        let links = self.write().remove_role_cascade(id);
        debug!(role_id = %id, links_removed = links, "Evicted role missing from store");
    }

    /// Rebuild the mirror from the store.
    ///
    /// The three tables are read concurrently. If any read fails the whole
    /// refresh fails and the previous mirror is kept.
    pub async fn load(&self) -> AppResult<()> {
        let (permissions, roles, assignments) = tokio::try_join!(
            self.store.list_permissions(),
            self.store.list_roles(),
            self.store.list_assignments(),
        )
        .inspect_err(|e| warn!(error = %e, "RBAC refresh failed; keeping previous mirror"))?;

        let mirror = Mirror::from_rows(permissions, roles, assignments);
        let summary = mirror.summary();
        *self.write() = mirror;

        info!(
            permissions = summary.permissions,
            roles = summary.roles,
            assignments = summary.assignments,
            "RBAC mirror refreshed"
        );
        Ok(())
    }

    /// Check the store behind this cache.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.store.health_check().await
    }

    // -- Permissions --

    /// Create a permission. Blank names are rejected before any remote
    /// call; a duplicate name comes back as a conflict from the store.
    pub async fn create_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        let name = normalize_name(name, "Permission")?;
        let description = normalize_description(description);

        let permission = self
            .store
            .insert_permission(&name, description.as_deref())
            .await
            .inspect_err(|e| warn!(name = %name, error = %e, "Create permission failed"))?;

        self.write().insert_permission(permission.clone());
        info!(permission_id = %permission.id, name = %permission.name, "Permission created");
        Ok(permission)
    }

    /// Rename or re-describe a permission. If the store reports the row
    /// missing, it is evicted from the mirror along with its links.
    pub async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        let name = normalize_name(name, "Permission")?;
        let description = normalize_description(description);
        let _busy = self.in_flight.begin([id.into_uuid()]);

        let permission = self
            .store
            .update_permission(id, &name, description.as_deref())
            .await
            .inspect_err(|e| {
                warn!(permission_id = %id, error = %e, "Update permission failed");
                if e.kind == ErrorKind::NotFound {
                    self.evict_permission(id);
                }
            })?;

        self.write().replace_permission(permission.clone());
        info!(permission_id = %id, name = %permission.name, "Permission updated");
        Ok(permission)
    }

    /// Delete a permission and, locally, every link to it. When the store
    /// no longer has the row, the local copy is dropped as well and
    /// `NotFound` is returned.
    pub async fn delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let _busy = self.in_flight.begin([id.into_uuid()]);

        let deleted = self
            .store
            .delete_permission(id)
            .await
            .inspect_err(|e| warn!(permission_id = %id, error = %e, "Delete permission failed"))?;
        if !deleted {
            self.evict_permission(id);
            return Err(AppError::not_found(format!("Permission {id} not found")));
        }

        let links = self.write().remove_permission_cascade(id);
        info!(permission_id = %id, links_removed = links, "Permission deleted");
        Ok(())
    }

    // -- Roles --

    /// Create a role.
    pub async fn create_role(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        let name = normalize_name(name, "Role")?;
        let description = normalize_description(description);

        let role = self
            .store
            .insert_role(&name, description.as_deref())
            .await
            .inspect_err(|e| warn!(name = %name, error = %e, "Create role failed"))?;

        self.write().insert_role(role.clone());
        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// Rename or re-describe a role. A row missing from the store is
    /// evicted locally.
    pub async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        let name = normalize_name(name, "Role")?;
        let description = normalize_description(description);
        let _busy = self.in_flight.begin([id.into_uuid()]);

        let role = self
            .store
            .update_role(id, &name, description.as_deref())
            .await
            .inspect_err(|e| {
                warn!(role_id = %id, error = %e, "Update role failed");
                if e.kind == ErrorKind::NotFound {
                    self.evict_role(id);
                }
            })?;

        self.write().replace_role(role.clone());
        info!(role_id = %id, name = %role.name, "Role updated");
        Ok(role)
    }

    /// Delete a role and, locally, every link from it. A row already gone
    /// from the store is dropped locally and reported as `NotFound`.
    pub async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        let _busy = self.in_flight.begin([id.into_uuid()]);

        let deleted = self
            .store
            .delete_role(id)
            .await
            .inspect_err(|e| warn!(role_id = %id, error = %e, "Delete role failed"))?;
        if !deleted {
            self.evict_role(id);
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        let links = self.write().remove_role_cascade(id);
        info!(role_id = %id, links_removed = links, "Role deleted");
        Ok(())
    }

    // -- Assignments --

    /// Grant a permission to a role.
    ///
    /// A pair that is already linked fails with
    /// [`ErrorKind::AlreadyAssigned`](rbac_core::ErrorKind::AlreadyAssigned)
    /// and changes nothing.
    pub async fn assign_permission_to_role(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment> {
        let _busy = self
            .in_flight
            .begin([role_id.into_uuid(), permission_id.into_uuid()]);

        let assignment = self
            .store
            .insert_assignment(role_id, permission_id)
            .await
            .inspect_err(|e| {
                warn!(%role_id, %permission_id, error = %e, "Assign permission failed")
            })?;

        self.write().insert_assignment(assignment.clone());
        info!(%role_id, %permission_id, "Permission assigned to role");
        Ok(assignment)
    }

    /// Revoke a permission from a role. Succeeds when the pair was not
    /// linked; the return value says whether a link was removed.
    pub async fn remove_permission_from_role(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let _busy = self
            .in_flight
            .begin([role_id.into_uuid(), permission_id.into_uuid()]);

        let removed = self
            .store
            .delete_assignment(role_id, permission_id)
            .await
            .inspect_err(|e| {
                warn!(%role_id, %permission_id, error = %e, "Remove permission failed")
            })?;

        let was_local = self.write().remove_assignment(role_id, permission_id);
        if removed == 0 {
            debug!(%role_id, %permission_id, was_local, "No link to remove");
        } else {
            info!(%role_id, %permission_id, "Permission removed from role");
        }
        Ok(removed > 0)
    }

    // -- Reads --

    /// Whether a mutation targeting `id` is outstanding.
    pub fn is_busy(&self, id: impl Into<Uuid>) -> bool {
        self.in_flight.is_busy(id.into())
    }

    /// Clone the whole mirror.
    pub fn snapshot(&self) -> Mirror {
        self.read().clone()
    }

    /// Permissions in display order.
    pub fn permissions(&self) -> Vec<Permission> {
        self.read().permissions().to_vec()
    }

    /// Roles in display order.
    pub fn roles(&self) -> Vec<Role> {
        self.read().roles().to_vec()
    }

    /// All links.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.read().assignments().to_vec()
    }

    /// Permissions a role grants, in permission display order.
    pub fn permissions_for_role(&self, role_id: RoleId) -> Vec<Permission> {
        self.read()
            .permissions_for_role(role_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Roles granting a permission, in role display order.
    pub fn roles_for_permission(&self, permission_id: PermissionId) -> Vec<Role> {
        self.read()
            .roles_for_permission(permission_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Case-insensitive exact lookup.
    pub fn find_role_by_name(&self, name: &str) -> Option<Role> {
        self.read().role_by_name(name).cloned()
    }

    /// Case-insensitive exact lookup.
    pub fn find_permission_by_name(&self, name: &str) -> Option<Permission> {
        self.read().permission_by_name(name).cloned()
    }

    /// Substring search over permission names and descriptions.
    pub fn search_permissions(&self, query: &str) -> Vec<Permission> {
        self.read()
            .search_permissions(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Substring search over role names and descriptions.
    pub fn search_roles(&self, query: &str) -> Vec<Role> {
        self.read().search_roles(query).into_iter().cloned().collect()
    }

    /// Dashboard counts.
    pub fn summary(&self) -> RbacSummary {
        self.read().summary()
    }

    /// Assignment matrix rows.
    pub fn matrix(&self) -> Vec<RoleGrants> {
        self.read().matrix()
    }
}
