//! Role-permission link record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rbac_core::types::{AssignmentId, PermissionId, RoleId};

/// One row of `role_permissions`: the role grants the permission.
///
/// The `(role_id, permission_id)` pair is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    /// Store-assigned identifier.
    pub id: AssignmentId,
    /// The granting role.
    pub role_id: RoleId,
    /// The granted permission.
    pub permission_id: PermissionId,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Whether this assignment links exactly this pair.
    pub fn links(&self, role_id: RoleId, permission_id: PermissionId) -> bool {
        self.role_id == role_id && self.permission_id == permission_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        let role_id = RoleId::new();
        let permission_id = PermissionId::new();
        let assignment = Assignment {
            id: AssignmentId::new(),
            role_id,
            permission_id,
            created_at: Utc::now(),
        };
        assert!(assignment.links(role_id, permission_id));
        assert!(!assignment.links(RoleId::new(), permission_id));
    }

    #[test]
    fn test_json_shape_matches_table_columns() {
        let assignment = Assignment {
            id: AssignmentId::new(),
            role_id: RoleId::new(),
            permission_id: PermissionId::new(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&assignment).expect("serialize");
        let object = value.as_object().expect("object");
        for column in ["id", "role_id", "permission_id", "created_at"] {
            assert!(object.contains_key(column), "missing {column}");
        }
    }
}
