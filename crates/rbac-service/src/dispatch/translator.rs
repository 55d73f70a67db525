//! Turns operator text into an [`AssistantAction`] via a language model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rbac_core::config::AssistantConfig;
use rbac_core::error::{AppError, ErrorKind};
use rbac_core::result::AppResult;

use crate::cache::RbacCache;

use super::action::AssistantAction;

const SYSTEM_PROMPT: &str = "You translate requests about role-based access control into exactly one JSON object \
and nothing else. The object has the fields \"action\", \"data\", and \"message\". \
\"action\" is one of create_permission, create_role, assign_permission, remove_permission, info, error. \
For create_permission and create_role, \"data\" is {\"name\": string, \"description\": string or null}. \
For assign_permission and remove_permission, \"data\" is {\"role_name\": string, \"permission_name\": string}. \
Use info to answer questions without changing anything and error when the request cannot be mapped. \
\"message\" is one short sentence for the operator.";

/// Current names the model may refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationContext {
    /// Role names in display order.
    pub roles: Vec<String>,
    /// Permission names in display order.
    pub permissions: Vec<String>,
}

impl TranslationContext {
    /// Capture names from the cache's current mirror.
    pub fn from_cache(cache: &RbacCache) -> Self {
        let mirror = cache.snapshot();
        Self {
            roles: mirror.roles().iter().map(|r| r.name.clone()).collect(),
            permissions: mirror.permissions().iter().map(|p| p.name.clone()).collect(),
        }
    }

    fn render(&self) -> String {
        format!(
            "Existing roles: {}.\nExisting permissions: {}.",
            list_or_none(&self.roles),
            list_or_none(&self.permissions)
        )
    }
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Something that can turn free text into an action.
#[async_trait]
pub trait ActionTranslator: Send + Sync {
    /// Translate `input`, given the names currently known.
    async fn translate(
        &self,
        input: &str,
        context: &TranslationContext,
    ) -> AppResult<AssistantAction>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletionTranslator {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

fn external(message: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::ExternalService, format!("{message}: {err}"), err)
}

impl ChatCompletionTranslator {
    /// Build a translator with its own HTTP client. The API key is read
    /// from the environment variable named in the config.
    pub fn new(config: &AssistantConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| external("Failed to build HTTP client", e))?;
        Ok(Self::with_client(config, client))
    }

    /// Build a translator from an existing client.
    pub fn with_client(config: &AssistantConfig, client: Client) -> Self {
        Self {
            client,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key(),
        }
    }

    /// Override the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl ActionTranslator for ChatCompletionTranslator {
    async fn translate(
        &self,
        input: &str,
        context: &TranslationContext,
    ) -> AppResult<AssistantAction> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: format!("{SYSTEM_PROMPT}\n{}", context.render()),
                },
                ChatMessage {
                    role: "user",
                    content: input.to_string(),
                },
            ],
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(url = %self.url, model = %self.model, "Requesting assistant action");
        let response = request
            .send()
            .await
            .map_err(|e| external("Assistant request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Assistant endpoint returned an error");
            return Err(AppError::external_service(format!(
                "Assistant endpoint returned {status}: {text}"
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| external("Assistant response was not understood", e))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::external_service("Assistant returned no content"))?;

        AssistantAction::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_render() {
        let context = TranslationContext {
            roles: vec!["Admin".to_string(), "Viewer".to_string()],
            permissions: Vec::new(),
        };
        assert_eq!(
            context.render(),
            "Existing roles: Admin, Viewer.\nExisting permissions: none."
        );
    }

    #[test]
    fn test_url_joins_endpoint() {
        let config = AssistantConfig {
            endpoint: "http://localhost:9000/v1/".to_string(),
            ..AssistantConfig::default()
        };
        let translator = ChatCompletionTranslator::with_client(&config, Client::new());
        assert_eq!(translator.url, "http://localhost:9000/v1/chat/completions");
    }
}
