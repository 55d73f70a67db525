//! In-process copy of the three RBAC tables.
//!
//! Every method here is a pure state transformation or a read; none of
//! them talk to the store. [`RbacCache`](crate::RbacCache) applies a
//! transformation only after the store has accepted the matching write.
//!
//! Permissions and roles are kept in byte-wise (case-sensitive) `name`
//! order at all times. Assignment order carries no meaning.

use serde::Serialize;

use rbac_core::types::{PermissionId, RoleId};
use rbac_entity::{Assignment, Named, Permission, Role};

/// Snapshot of permissions, roles, and their links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mirror {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    assignments: Vec<Assignment>,
}

/// Dashboard counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RbacSummary {
    /// Number of permissions.
    pub permissions: usize,
    /// Number of roles.
    pub roles: usize,
    /// Number of role-permission links.
    pub assignments: usize,
    /// Roles that grant nothing.
    pub empty_roles: usize,
    /// Permissions no role grants.
    pub unassigned_permissions: usize,
}

/// One row of the assignment matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleGrants {
    /// The role.
    pub role: Role,
    /// Granted permission ids, in permission display order.
    pub permission_ids: Vec<PermissionId>,
}

fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

fn insert_sorted<T: Named>(items: &mut Vec<T>, item: T) {
    let pos = items.partition_point(|existing| existing.name() <= item.name());
    items.insert(pos, item);
}

fn matches_query<T: Named>(item: &T, needle: &str) -> bool {
    item.name().to_lowercase().contains(needle)
        || item
            .description()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

impl Mirror {
    /// Build a mirror from freshly read rows, sorting as needed.
    pub fn from_rows(
        mut permissions: Vec<Permission>,
        mut roles: Vec<Role>,
        assignments: Vec<Assignment>,
    ) -> Self {
        sort_by_name(&mut permissions);
        sort_by_name(&mut roles);
        Self {
            permissions,
            roles,
            assignments,
        }
    }

    /// Permissions in display order.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Roles in display order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// All links.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    // -- Reconciliation --

    /// Add a newly created permission at its sorted position.
    pub fn insert_permission(&mut self, permission: Permission) {
        self.permissions.retain(|p| p.id != permission.id);
        insert_sorted(&mut self.permissions, permission);
    }

    /// Replace the permission with the same id and restore order. A row
    /// the mirror had not seen yet is inserted.
    pub fn replace_permission(&mut self, permission: Permission) {
        match self.permissions.iter_mut().find(|p| p.id == permission.id) {
            Some(existing) => *existing = permission,
            None => self.permissions.push(permission),
        }
        sort_by_name(&mut self.permissions);
    }

    /// Remove a permission and every link to it. Returns the number of
    /// links removed.
    pub fn remove_permission_cascade(&mut self, id: PermissionId) -> usize {
        self.permissions.retain(|p| p.id != id);
        let before = self.assignments.len();
        self.assignments.retain(|a| a.permission_id != id);
        before - self.assignments.len()
    }

    /// Add a newly created role at its sorted position.
    pub fn insert_role(&mut self, role: Role) {
        self.roles.retain(|r| r.id != role.id);
        insert_sorted(&mut self.roles, role);
    }

    /// Replace the role with the same id and restore order.
    pub fn replace_role(&mut self, role: Role) {
        match self.roles.iter_mut().find(|r| r.id == role.id) {
            Some(existing) => *existing = role,
            None => self.roles.push(role),
        }
        sort_by_name(&mut self.roles);
    }

    /// Remove a role and every link from it. Returns the number of links
    /// removed.
    pub fn remove_role_cascade(&mut self, id: RoleId) -> usize {
        self.roles.retain(|r| r.id != id);
        let before = self.assignments.len();
        self.assignments.retain(|a| a.role_id != id);
        before - self.assignments.len()
    }

    /// Record a link the store accepted. Any stale local copy of the same
    /// pair is dropped first so the pair stays unique.
    pub fn insert_assignment(&mut self, assignment: Assignment) {
        self.assignments
            .retain(|a| !a.links(assignment.role_id, assignment.permission_id));
        self.assignments.push(assignment);
    }

    /// Drop the link for this pair. Returns whether one was present.
    pub fn remove_assignment(&mut self, role_id: RoleId, permission_id: PermissionId) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|a| !a.links(role_id, permission_id));
        before != self.assignments.len()
    }

    // -- Derived queries --

    /// Look up a permission by id.
    pub fn permission(&self, id: PermissionId) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }

    /// Look up a role by id.
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// Case-insensitive exact name match.
    pub fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        let wanted = name.trim().to_lowercase();
        self.permissions
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
    }

    /// Case-insensitive exact name match.
    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        let wanted = name.trim().to_lowercase();
        self.roles.iter().find(|r| r.name.to_lowercase() == wanted)
    }

    /// Whether the pair is linked.
    pub fn is_assigned(&self, role_id: RoleId, permission_id: PermissionId) -> bool {
        self.assignments
            .iter()
            .any(|a| a.links(role_id, permission_id))
    }

    /// Permissions granted by a role, in permission display order.
    pub fn permissions_for_role(&self, role_id: RoleId) -> Vec<&Permission> {
        self.permissions
            .iter()
            .filter(|p| self.is_assigned(role_id, p.id))
            .collect()
    }

    /// Roles granting a permission, in role display order.
    pub fn roles_for_permission(&self, permission_id: PermissionId) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|r| self.is_assigned(r.id, permission_id))
            .collect()
    }

    /// Permissions whose name or description contains `query`, ignoring
    /// case. An empty query matches everything.
    pub fn search_permissions(&self, query: &str) -> Vec<&Permission> {
        let needle = query.trim().to_lowercase();
        self.permissions
            .iter()
            .filter(|p| matches_query(*p, &needle))
            .collect()
    }

    /// Roles whose name or description contains `query`, ignoring case.
    pub fn search_roles(&self, query: &str) -> Vec<&Role> {
        let needle = query.trim().to_lowercase();
        self.roles
            .iter()
            .filter(|r| matches_query(*r, &needle))
            .collect()
    }

    /// Counts for the dashboard view.
    pub fn summary(&self) -> RbacSummary {
        RbacSummary {
            permissions: self.permissions.len(),
            roles: self.roles.len(),
            assignments: self.assignments.len(),
            empty_roles: self
                .roles
                .iter()
                .filter(|r| !self.assignments.iter().any(|a| a.role_id == r.id))
                .count(),
            unassigned_permissions: self
                .permissions
                .iter()
                .filter(|p| !self.assignments.iter().any(|a| a.permission_id == p.id))
                .count(),
        }
    }

    /// Role-by-permission grid backing the assignment matrix view.
    pub fn matrix(&self) -> Vec<RoleGrants> {
        self.roles
            .iter()
            .map(|role| RoleGrants {
                role: role.clone(),
                permission_ids: self
                    .permissions_for_role(role.id)
                    .into_iter()
                    .map(|p| p.id)
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use rbac_core::types::AssignmentId;

    use super::*;

    fn permission(name: &str) -> Permission {
        Permission {
            id: PermissionId::new(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn role(name: &str) -> Role {
        Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn link(role: &Role, permission: &Permission) -> Assignment {
        Assignment {
            id: AssignmentId::new(),
            role_id: role.id,
            permission_id: permission.id,
            created_at: Utc::now(),
        }
    }

    fn names<T: Named>(items: &[T]) -> Vec<&str> {
        items.iter().map(Named::name).collect()
    }

    #[test]
    fn test_from_rows_sorts_case_sensitively() {
        let mirror = Mirror::from_rows(
            vec![permission("delete"), permission("Admin"), permission("create")],
            vec![role("viewer"), role("Editor")],
            Vec::new(),
        );
        assert_eq!(names(mirror.permissions()), ["Admin", "create", "delete"]);
        assert_eq!(names(mirror.roles()), ["Editor", "viewer"]);
    }

    #[test]
    fn test_insert_and_replace_keep_order() {
        let mut mirror = Mirror::default();
        mirror.insert_permission(permission("can_write"));
        mirror.insert_permission(permission("can_admin"));
        mirror.insert_permission(permission("can_read"));
        assert_eq!(
            names(mirror.permissions()),
            ["can_admin", "can_read", "can_write"]
        );

        let mut renamed = mirror.permissions()[0].clone();
        renamed.name = "can_zap".to_string();
        mirror.replace_permission(renamed.clone());
        assert_eq!(names(mirror.permissions()), ["can_read", "can_write", "can_zap"]);
        assert_eq!(mirror.permission(renamed.id).map(|p| p.name.as_str()), Some("can_zap"));
    }

    #[test]
    fn test_remove_role_cascades() {
        let editor = role("Editor");
        let viewer = role("Viewer");
        let read = permission("can_read");
        let mut mirror = Mirror::from_rows(
            vec![read.clone()],
            vec![editor.clone(), viewer.clone()],
            vec![link(&editor, &read), link(&viewer, &read)],
        );

        assert_eq!(mirror.remove_role_cascade(editor.id), 1);
        assert!(mirror.role(editor.id).is_none());
        let granting: Vec<_> = mirror
            .roles_for_permission(read.id)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(granting, ["Viewer"]);
        assert!(mirror.permissions_for_role(editor.id).is_empty());
    }

    #[test]
    fn test_remove_permission_cascades() {
        let editor = role("Editor");
        let read = permission("can_read");
        let write = permission("can_write");
        let mut mirror = Mirror::from_rows(
            vec![read.clone(), write.clone()],
            vec![editor.clone()],
            vec![link(&editor, &read), link(&editor, &write)],
        );

        assert_eq!(mirror.remove_permission_cascade(write.id), 1);
        let granted: Vec<_> = mirror
            .permissions_for_role(editor.id)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(granted, ["can_read"]);
        assert_eq!(mirror.assignments().len(), 1);
    }

    #[test]
    fn test_insert_assignment_keeps_pair_unique() {
        let editor = role("Editor");
        let read = permission("can_read");
        let mut mirror =
            Mirror::from_rows(vec![read.clone()], vec![editor.clone()], Vec::new());
        mirror.insert_assignment(link(&editor, &read));
        mirror.insert_assignment(link(&editor, &read));
        assert_eq!(mirror.assignments().len(), 1);
        assert!(mirror.remove_assignment(editor.id, read.id));
        assert!(!mirror.remove_assignment(editor.id, read.id));
    }

    #[test]
    fn test_derived_queries_follow_display_order() {
        let admin = role("Admin");
        let editor = role("Editor");
        let a = permission("a_perm");
        let b = permission("b_perm");
        let mirror = Mirror::from_rows(
            vec![b.clone(), a.clone()],
            vec![editor.clone(), admin.clone()],
            vec![link(&editor, &b), link(&admin, &b), link(&editor, &a)],
        );

        let perms: Vec<_> = mirror
            .permissions_for_role(editor.id)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(perms, ["a_perm", "b_perm"]);

        let roles: Vec<_> = mirror
            .roles_for_permission(b.id)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(roles, ["Admin", "Editor"]);
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        let mirror = Mirror::from_rows(
            vec![permission("can_Publish")],
            vec![role("Marketing Manager")],
            Vec::new(),
        );
        assert!(mirror.role_by_name("marketing manager").is_some());
        assert!(mirror.permission_by_name("CAN_PUBLISH").is_some());
        assert!(mirror.role_by_name("Marketing").is_none());
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let mut reports = permission("can_view_reports");
        reports.description = Some("Read the Quarterly dashboards".to_string());
        let mirror = Mirror::from_rows(
            vec![reports, permission("can_edit")],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(mirror.search_permissions("REPORT").len(), 1);
        assert_eq!(mirror.search_permissions("quarterly").len(), 1);
        assert_eq!(mirror.search_permissions("").len(), 2);
        assert!(mirror.search_roles("anything").is_empty());
    }

    #[test]
    fn test_summary_and_matrix() {
        let editor = role("Editor");
        let guest = role("Guest");
        let read = permission("can_read");
        let write = permission("can_write");
        let mirror = Mirror::from_rows(
            vec![write.clone(), read.clone()],
            vec![guest.clone(), editor.clone()],
            vec![link(&editor, &write), link(&editor, &read)],
        );

        let summary = mirror.summary();
        assert_eq!(summary.permissions, 2);
        assert_eq!(summary.roles, 2);
        assert_eq!(summary.assignments, 2);
        assert_eq!(summary.empty_roles, 1);
        assert_eq!(summary.unassigned_permissions, 0);

        let matrix = mirror.matrix();
        assert_eq!(matrix[0].role.name, "Editor");
        assert_eq!(matrix[0].permission_ids, vec![read.id, write.id]);
        assert!(matrix[1].permission_ids.is_empty());
    }
}
