//! Role management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::permission::PermissionRow;
use crate::output::{self, OutputFormat};
use rbac_core::error::AppError;
use rbac_entity::Role;
use rbac_service::RbacCache;

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List roles in display order
    List {
        /// Only show roles whose name or description contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a role
    Create {
        /// Role name, e.g. "Marketing Manager"
        name: String,
        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a role
    Update {
        /// Current role name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a role and its permission links
    Delete {
        /// Role name
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show a role and the permissions it grants
    Show {
        /// Role name
        name: String,
    },
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: String,
    /// Name
    name: String,
    /// Description
    description: String,
    /// Number of granted permissions
    permissions: usize,
    /// Created at
    created_at: String,
}

impl RoleRow {
    fn new(cache: &RbacCache, role: &Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name.clone(),
            description: role.description.clone().unwrap_or_default(),
            permissions: cache.permissions_for_role(role.id).len(),
            created_at: role.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub(crate) fn find(cache: &RbacCache, name: &str) -> Result<Role, AppError> {
    cache
        .find_role_by_name(name)
        .ok_or_else(|| AppError::not_found(format!("Role '{name}' not found")))
}

/// Execute role commands
pub async fn execute(
    args: &RoleArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;

    match &args.command {
        RoleCommand::List { search } => {
            let roles = match search {
                Some(query) => cache.search_roles(query),
                None => cache.roles(),
            };
            let rows: Vec<RoleRow> = roles.iter().map(|r| RoleRow::new(&cache, r)).collect();
            output::print_list(&rows, format);
        }
        RoleCommand::Create { name, description } => {
            let role = match cache.create_role(name, description.as_deref()).await {
                Ok(role) => role,
                Err(e) if e.is_constraint_violation() => {
                    output::print_warning(&format!("Role '{}' already exists", name.trim()));
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            output::print_success(&format!("Role '{}' created", role.name));
            output::print_item(&RoleRow::new(&cache, &role), format);
        }
        RoleCommand::Update {
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
            let role = cache
                .update_role(current.id, new_name, new_description)
                .await?;
            output::print_success(&format!("Role '{}' updated", role.name));
        }
        RoleCommand::Delete { name, force } => {
            let role = find(&cache, name)?;
            let grants = cache.permissions_for_role(role.id).len();
            let prompt = format!(
                "Delete role '{}' and its {grants} permission link(s)?",
                role.name
            );
            if !output::confirm(&prompt, *force)? {
                return Ok(());
            }
            cache.delete_role(role.id).await?;
            output::print_success(&format!("Role '{}' deleted", role.name));
        }
        RoleCommand::Show { name } => {
            let role = find(&cache, name)?;
            output::print_item(&RoleRow::new(&cache, &role), format);
            let granted: Vec<PermissionRow> = cache
                .permissions_for_role(role.id)
                .iter()
                .map(|p| PermissionRow::new(&cache, p))
                .collect();
            output::print_list(&granted, format);
        }
    }

    Ok(())
}
