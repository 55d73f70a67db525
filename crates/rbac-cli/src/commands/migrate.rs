//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use rbac_core::error::AppError;
use rbac_database::DatabasePool;
use rbac_database::migration;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show applied migrations
    Status,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    super::require_persistent_store(&config)?;
    config.database.run_migrations = false;
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run { force } => {
            let prompt = format!("Apply pending migrations to {}?", db.display_url());
            if !output::confirm(&prompt, *force)? {
                return Ok(());
            }
            migration::run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied = migration::applied_migrations(db.pool()).await?;
            if applied.is_empty() {
                output::print_warning("No migrations have been applied.");
            }
            for entry in &applied {
                let state = if entry.success { "applied" } else { "failed" };
                output::print_kv(
                    &entry.version.to_string(),
                    &format!("{} ({state})", entry.description),
                );
            }
        }
    }

    db.close().await;
    Ok(())
}
