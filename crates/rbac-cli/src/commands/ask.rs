//! One-shot natural-language request.

use clap::Args;

use crate::output::{self, OutputFormat};
use rbac_core::error::AppError;
use rbac_service::Assistant;
use rbac_service::dispatch::ChatCompletionTranslator;

/// Arguments for the ask command
#[derive(Debug, Args)]
pub struct AskArgs {
    /// What to do, e.g. "let marketing managers publish content"
    #[arg(required = true, num_args = 1..)]
    pub request: Vec<String>,
}

/// Translate the request, apply it, and report the outcome.
pub async fn execute(
    args: &AskArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if !config.assistant.enabled {
        return Err(AppError::configuration(
            "The assistant is disabled (assistant.enabled = false)",
        ));
    }

    let cache = super::open_cache(&config).await?;
    let translator = ChatCompletionTranslator::new(&config.assistant)?;
    let assistant = Assistant::new(cache, Box::new(translator));

    let (action, outcome) = assistant.handle(&args.request.join(" ")).await?;
    match format {
        OutputFormat::Table => {
            if !action.message.is_empty() {
                output::print_kv("Assistant", &action.message);
            }
            output::print_success(&outcome.summary());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)?;
            println!("{json}");
        }
    }
    Ok(())
}
