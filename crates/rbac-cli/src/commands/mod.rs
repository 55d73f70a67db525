//! CLI command definitions and dispatch.

pub mod ask;
pub mod assign;
pub mod migrate;
pub mod permission;
pub mod role;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use rbac_core::config::AppConfig;
use rbac_core::error::AppError;
use rbac_database::store::MEMORY_URL_SCHEME;
use rbac_service::RbacCache;

/// RBAC Console: manage roles, permissions, and their assignments
#[derive(Debug, Parser)]
#[command(name = "rbac", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Permission management
    Permission(permission::PermissionArgs),
    /// Role management
    Role(role::RoleArgs),
    /// Grant a permission to a role
    Assign(assign::LinkArgs),
    /// Revoke a permission from a role
    Unassign(assign::LinkArgs),
    /// Describe a change in plain language and apply it
    Ask(ask::AskArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Store health and counts
    Status,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Permission(args) => {
                permission::execute(args, &self.config, self.format).await
            }
            Commands::Role(args) => role::execute(args, &self.config, self.format).await,
            Commands::Assign(args) => assign::assign(args, &self.config).await,
            Commands::Unassign(args) => assign::unassign(args, &self.config).await,
            Commands::Ask(args) => ask::execute(args, &self.config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Status => status::execute(&self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: refuse the in-memory store, which would start empty on every
/// invocation and forget every change on exit
pub fn require_persistent_store(config: &AppConfig) -> Result<(), AppError> {
    if config.database.url.starts_with(MEMORY_URL_SCHEME) {
        return Err(AppError::configuration(
            "rbac-cli needs a PostgreSQL database.url; the in-memory store only lives \
             as long as one process (use the interactive console for memory: sessions)",
        ));
    }
    Ok(())
}

/// Helper: open the configured store and fill a cache from it
pub async fn open_cache(config: &AppConfig) -> Result<Arc<RbacCache>, AppError> {
    require_persistent_store(config)?;
    let store = rbac_database::open_store(&config.database).await?;
    let cache = Arc::new(RbacCache::new(store));
    cache.load().await?;
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rbac_core::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_assign_by_name() {
        let cli = Cli::try_parse_from(["rbac", "assign", "Marketing Manager", "can_publish_content"])
            .unwrap();
        match cli.command {
            Commands::Assign(args) => {
                assert_eq!(args.role, "Marketing Manager");
                assert_eq!(args.permission, "can_publish_content");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, "config/default.toml");
    }

    fn config_with_url(url: &str) -> AppConfig {
        AppConfig::from_toml_str(&format!("[database]\nurl = \"{url}\"\n")).unwrap()
    }

    #[test]
    fn test_memory_store_is_rejected() {
        let err = require_persistent_store(&config_with_url("memory:")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("PostgreSQL"));

        assert!(
            require_persistent_store(&config_with_url("postgres://rbac@localhost/rbac")).is_ok()
        );
    }
}
