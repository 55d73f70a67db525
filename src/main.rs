//! RBAC Console: a natural-language front end over the RBAC cache.
//!
//! Reads operator requests line by line, asks the configured language
//! model for a structured action, and applies it through the cache.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

use rbac_core::config::AppConfig;
use rbac_core::error::AppError;
use rbac_service::dispatch::ChatCompletionTranslator;
use rbac_service::{Assistant, RbacCache};

const HELP: &str = "\
Type a request such as \"create a role called Marketing Manager\".
Built-in commands:
  roles         list roles and their permissions
  permissions   list permissions
  summary       show counts
  refresh       reload everything from the store
  help          show this text
  quit          leave the console";

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Console error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("RBAC_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RBAC console v{}", env!("CARGO_PKG_VERSION"));

    let store = rbac_database::open_store(&config.database).await?;
    let cache = Arc::new(RbacCache::new(store));
    cache.load().await?;

    let assistant = if config.assistant.enabled {
        let translator = ChatCompletionTranslator::new(&config.assistant)?;
        Some(Assistant::new(Arc::clone(&cache), Box::new(translator)))
    } else {
        tracing::info!("Assistant disabled; only built-in commands are available");
        None
    };

    println!("{HELP}");
    print_summary(&cache);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "summary" => print_summary(&cache),
            "roles" => print_roles(&cache),
            "permissions" => print_permissions(&cache),
            "refresh" => match cache.load().await {
                Ok(()) => print_summary(&cache),
                Err(e) => println!("✗ Refresh failed, showing previous data: {e}"),
            },
            request => match &assistant {
                Some(assistant) => match assistant.handle(request).await {
                    Ok((action, outcome)) => {
                        if !action.message.is_empty() {
                            println!("  {}", action.message);
                        }
                        println!("✓ {}", outcome.summary());
                    }
                    Err(e) => println!("✗ {e}"),
                },
                None => println!("✗ The assistant is disabled; type 'help' for commands"),
            },
        }
    }

    tracing::info!("RBAC console closed");
    Ok(())
}

fn print_summary(cache: &RbacCache) {
    let summary = cache.summary();
    println!(
        "{} role(s), {} permission(s), {} assignment(s)",
        summary.roles, summary.permissions, summary.assignments
    );
}

fn print_roles(cache: &RbacCache) {
    let roles = cache.roles();
    if roles.is_empty() {
        println!("No roles yet.");
    }
    for role in roles {
        let granted: Vec<String> = cache
            .permissions_for_role(role.id)
            .into_iter()
            .map(|p| p.name)
            .collect();
        if granted.is_empty() {
            println!("  {}", role.name);
        } else {
            println!("  {}: {}", role.name, granted.join(", "));
        }
    }
}

fn print_permissions(cache: &RbacCache) {
    let permissions = cache.permissions();
    if permissions.is_empty() {
        println!("No permissions yet.");
    }
    for permission in permissions {
        match &permission.description {
            Some(description) => println!("  {} ({description})", permission.name),
            None => println!("  {}", permission.name),
        }
    }
}
