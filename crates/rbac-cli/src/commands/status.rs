//! Store health and dashboard counts.

use serde::Serialize;

use crate::output::{self, OutputFormat};
use rbac_core::error::AppError;
use rbac_database::connection::mask_password;
use rbac_service::RbacSummary;

#[derive(Debug, Serialize)]
struct StatusReport {
    store: String,
    healthy: bool,
    summary: RbacSummary,
}

/// Print store health plus counts from a fresh load.
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let cache = super::open_cache(&config).await?;

    let report = StatusReport {
        store: mask_password(&config.database.url),
        healthy: cache.health_check().await?,
        summary: cache.summary(),
    };

    match format {
        OutputFormat::Table => {
            output::print_kv("Store", &report.store);
            output::print_kv("Healthy", if report.healthy { "yes" } else { "no" });
            output::print_kv("Roles", &report.summary.roles.to_string());
            output::print_kv("Permissions", &report.summary.permissions.to_string());
            output::print_kv("Assignments", &report.summary.assignments.to_string());
            output::print_kv(
                "Roles without permissions",
                &report.summary.empty_roles.to_string(),
            );
            output::print_kv(
                "Unassigned permissions",
                &report.summary.unassigned_permissions.to_string(),
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
