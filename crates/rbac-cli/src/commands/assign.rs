//! Role/permission link commands.

use clap::Args;

use crate::output;
use rbac_core::error::AppError;

/// A role and permission, both by name
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Role name
    pub role: String,
    /// Permission name
    pub permission: String,
}

/// Grant `args.permission` to `args.role`.
pub async fn assign(args: &LinkArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;
    let role = super::role::find(&cache, &args.role)?;
    let permission = super::permission::find(&cache, &args.permission)?;

    match cache.assign_permission_to_role(role.id, permission.id).await {
        Ok(_) => output::print_success(&format!(
            "Permission '{}' assigned to role '{}'",
            permission.name, role.name
        )),
        Err(e) if e.is_constraint_violation() => output::print_warning(&format!(
            "Role '{}' already has permission '{}'",
            role.name, permission.name
        )),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Revoke `args.permission` from `args.role`.
pub async fn unassign(args: &LinkArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;
    let role = super::role::find(&cache, &args.role)?;
    let permission = super::permission::find(&cache, &args.permission)?;

    if cache
        .remove_permission_from_role(role.id, permission.id)
        .await?
    {
        output::print_success(&format!(
            "Permission '{}' removed from role '{}'",
            permission.name, role.name
        ));
    } else {
        output::print_warning(&format!(
            "Role '{}' did not have permission '{}'",
            role.name, permission.name
        ));
    }
    Ok(())
}
