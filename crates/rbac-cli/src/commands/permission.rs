//! Permission management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use rbac_core::error::AppError;
use rbac_entity::Permission;
use rbac_service::RbacCache;

/// Arguments for permission commands
#[derive(Debug, Args)]
pub struct PermissionArgs {
    /// Permission subcommand
    #[command(subcommand)]
    pub command: PermissionCommand,
}

/// Permission subcommands
#[derive(Debug, Subcommand)]
pub enum PermissionCommand {
    /// List permissions in display order
    List {
        /// Only show permissions whose name or description contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a permission
    Create {
        /// Permission name, e.g. can_publish_content
        name: String,
        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a permission
    Update {
        /// Current permission name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a permission and its role links
    Delete {
        /// Permission name
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Permission display row for table output
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct PermissionRow {
    /// Permission ID
    id: String,
    /// Name
    name: String,
    /// Description
    description: String,
    /// Number of roles granting it
    roles: usize,
    /// Created at
    created_at: String,
}

impl PermissionRow {
    pub(crate) fn new(cache: &RbacCache, permission: &Permission) -> Self {
        Self {
            id: permission.id.to_string(),
            name: permission.name.clone(),
            description: permission.description.clone().unwrap_or_default(),
            roles: cache.roles_for_permission(permission.id).len(),
            created_at: permission.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub(crate) fn find(cache: &RbacCache, name: &str) -> Result<Permission, AppError> {
    cache
        .find_permission_by_name(name)
        .ok_or_else(|| AppError::not_found(format!("Permission '{name}' not found")))
}

/// Execute permission commands
pub async fn execute(
    args: &PermissionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;

    match &args.command {
        PermissionCommand::List { search } => {
            let permissions = match search {
                Some(query) => cache.search_permissions(query),
                None => cache.permissions(),
            };
            let rows: Vec<PermissionRow> = permissions
                .iter()
                .map(|p| PermissionRow::new(&cache, p))
                .collect();
            output::print_list(&rows, format);
        }
        PermissionCommand::Create { name, description } => {
            let permission = match cache
                .create_permission(name, description.as_deref())
                .await
            {
                Ok(permission) => permission,
                Err(e) if e.is_constraint_violation() => {
                    let name = name.trim();
                    output::print_warning(&format!("Permission '{name}' already exists"));
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            output::print_success(&format!("Permission '{}' created", permission.name));
            output::print_item(&PermissionRow::new(&cache, &permission), format);
        }
        PermissionCommand::Update {
            name,
            rename,
            description,
        } => {
            let current = find(&cache, name)?;
            let new_name = rename.as_deref().unwrap_or(&current.name);
            let new_description = match description {
                Some(d) => Some(d.as_str()),
                None => current.description.as_deref(),
            };
            let permission = cache
                .update_permission(current.id, new_name, new_description)
                .await?;
            output::print_success(&format!("Permission '{}' updated", permission.name));
        }
        PermissionCommand::Delete { name, force } => {
            let permission = find(&cache, name)?;
            let granted_by = cache.roles_for_permission(permission.id).len();
            let prompt = format!(
                "Delete permission '{}' (granted by {granted_by} role(s))?",
                permission.name
            );
            if !output::confirm(&prompt, *force)? {
                return Ok(());
            }
            cache.delete_permission(permission.id).await?;
            output::print_success(&format!("Permission '{}' deleted", permission.name));
        }
    }

    Ok(())
}
