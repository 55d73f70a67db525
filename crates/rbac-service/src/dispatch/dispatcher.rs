//! Executes an [`AssistantAction`] against the cache.

use serde::Serialize;
use tracing::info;

use rbac_core::error::AppError;
use rbac_core::result::AppResult;
use rbac_entity::{Assignment, Permission, Role};

use crate::cache::RbacCache;

use super::action::{ActionKind, AssistantAction, LinkPayload};

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A permission was created.
    PermissionCreated {
        /// The stored permission.
        permission: Permission,
    },
    /// A role was created.
    RoleCreated {
        /// The stored role.
        role: Role,
    },
    /// A permission was linked to a role.
    Assigned {
        /// Resolved role.
        role: Role,
        /// Resolved permission.
        permission: Permission,
        /// The stored link.
        assignment: Assignment,
    },
    /// A link removal was executed.
    Removed {
        /// Resolved role.
        role: Role,
        /// Resolved permission.
        permission: Permission,
        /// Whether a link actually existed.
        removed: bool,
    },
    /// Nothing to execute; the model only answered.
    Info {
        /// The model's answer.
        message: String,
    },
}

impl DispatchOutcome {
    /// One-line description for the operator.
    pub fn summary(&self) -> String {
        match self {
            Self::PermissionCreated { permission } => {
                format!("Permission '{}' created", permission.name)
            }
            Self::RoleCreated { role } => format!("Role '{}' created", role.name),
            Self::Assigned {
                role, permission, ..
            } => format!(
                "Permission '{}' assigned to role '{}'",
                permission.name, role.name
            ),
            Self::Removed {
                role,
                permission,
                removed: true,
            } => format!(
                "Permission '{}' removed from role '{}'",
                permission.name, role.name
            ),
            Self::Removed {
                role,
                permission,
                removed: false,
            } => format!(
                "Role '{}' did not have permission '{}'",
                role.name, permission.name
            ),
            Self::Info { message } => message.clone(),
        }
    }
}

/// Resolve a link payload's names against the current mirror. Fails
/// without touching the store when either name is unknown.
fn resolve(cache: &RbacCache, payload: &LinkPayload) -> AppResult<(Role, Permission)> {
    let role = cache
        .find_role_by_name(&payload.role_name)
        .ok_or_else(|| AppError::not_found(format!("Role '{}' not found", payload.role_name)))?;
    let permission = cache
        .find_permission_by_name(&payload.permission_name)
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Permission '{}' not found",
                payload.permission_name
            ))
        })?;
    Ok((role, permission))
}

/// Run `action` through the cache's CRUD operations.
pub async fn dispatch(cache: &RbacCache, action: &AssistantAction) -> AppResult<DispatchOutcome> {
    info!(action = %action.action, "Dispatching assistant action");

    match action.action {
        ActionKind::CreatePermission => {
            let payload = action.create_payload()?;
            let permission = cache
                .create_permission(&payload.name, payload.description.as_deref())
                .await?;
            Ok(DispatchOutcome::PermissionCreated { permission })
        }
        ActionKind::CreateRole => {
            let payload = action.create_payload()?;
            let role = cache
                .create_role(&payload.name, payload.description.as_deref())
                .await?;
            Ok(DispatchOutcome::RoleCreated { role })
        }
        ActionKind::AssignPermission => {
            let (role, permission) = resolve(cache, &action.link_payload()?)?;
            let assignment = cache
                .assign_permission_to_role(role.id, permission.id)
                .await
                .map_err(|e| match e.kind {
                    rbac_core::ErrorKind::AlreadyAssigned => AppError::already_assigned(format!(
                        "Role '{}' already has permission '{}'",
                        role.name, permission.name
                    )),
                    _ => e,
                })?;
            Ok(DispatchOutcome::Assigned {
                role,
                permission,
                assignment,
            })
        }
        ActionKind::RemovePermission => {
            let (role, permission) = resolve(cache, &action.link_payload()?)?;
            let removed = cache
                .remove_permission_from_role(role.id, permission.id)
                .await?;
            Ok(DispatchOutcome::Removed {
                role,
                permission,
                removed,
            })
        }
        ActionKind::Info => Ok(DispatchOutcome::Info {
            message: action.message.clone(),
        }),
        ActionKind::Error => Err(AppError::validation(if action.message.is_empty() {
            "The assistant could not interpret that request".to_string()
        } else {
            action.message.clone()
        })),
    }
}
