//! Natural-language assistant configuration.

use serde::{Deserialize, Serialize};

/// Settings for the chat-completions endpoint that turns operator text
/// into structured actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Whether the assistant is available at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,
}

impl AssistantConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
            temperature: 0.0,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "RBAC_ASSISTANT_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}
