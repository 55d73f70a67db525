//! Natural-language front end: translate, then dispatch.

pub mod action;
pub mod dispatcher;
pub mod translator;

use std::sync::Arc;

use tracing::info;

use rbac_core::result::AppResult;

pub use action::{ActionKind, AssistantAction, CreatePayload, LinkPayload};
pub use dispatcher::{DispatchOutcome, dispatch};
pub use translator::{ActionTranslator, ChatCompletionTranslator, TranslationContext};

use crate::cache::RbacCache;

/// One console session: a cache plus the translator feeding it.
pub struct Assistant {
    cache: Arc<RbacCache>,
    translator: Box<dyn ActionTranslator>,
}

impl Assistant {
    /// Pair a cache with a translator.
    pub fn new(cache: Arc<RbacCache>, translator: Box<dyn ActionTranslator>) -> Self {
        Self { cache, translator }
    }

    /// The cache this session writes to.
    pub fn cache(&self) -> &RbacCache {
        &self.cache
    }

    /// Translate `input` against the current names and execute the result.
    pub async fn handle(&self, input: &str) -> AppResult<(AssistantAction, DispatchOutcome)> {
        let context = TranslationContext::from_cache(&self.cache);
        let action = self.translator.translate(input, &context).await?;
        info!(action = %action.action, message = %action.message, "Assistant proposed action");
        let outcome = dispatch(&self.cache, &action).await?;
        Ok((action, outcome))
    }
}
