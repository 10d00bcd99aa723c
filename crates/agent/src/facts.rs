//! Fact extraction: a constrained, low-temperature generation call that
//! distills what the user has said into plain, advice-free statements.
//!
//! Best-effort: any failure yields empty facts and the pipeline carries on.

use std::sync::Arc;
use std::time::Duration;

use curhat_core::error::PipelineError;
use curhat_core::provider::{Provider, ProviderRequest};
use tracing::{debug, warn};

use crate::generation::complete_within;

const SYSTEM: &str = "You extract objective facts from conversations. You never give advice, \
opinions, or comfort.";

pub struct FactExtractor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl FactExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 256,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Facts for `utterance` given the session memory `context`.
    /// Empty when the Generation Service fails or times out.
    pub async fn extract(&self, utterance: &str, context: &str) -> String {
        match self.try_extract(utterance, context).await {
            Ok(facts) => {
                debug!(facts_len = facts.len(), "Facts extracted");
                facts
            }
            Err(e) => {
                warn!(error = %e, "Fact extraction failed, continuing without facts");
                String::new()
            }
        }
    }

    pub async fn try_extract(&self, utterance: &str, context: &str) -> Result<String, PipelineError> {
        let request = ProviderRequest::prompt(
            &self.model,
            SYSTEM,
            fact_prompt(utterance, context),
            self.temperature,
            self.max_tokens,
        );
        let text = complete_within(self.provider.as_ref(), request, self.timeout).await?;
        Ok(text.trim().to_string())
    }
}

fn fact_prompt(utterance: &str, context: &str) -> String {
    format!(
        "Extract only the objective facts from the conversation below.\n\
         Rules:\n\
         - State what happened and what the user reports feeling, in short plain sentences.\n\
         - Do not give advice, suggestions, or reassurance.\n\
         - Do not add anything the user did not say.\n\
         - Write the facts in English.\n\n\
         Conversation so far:\n{}\n\n\
         New message:\n{}\n\n\
         Facts:",
        context.trim(),
        utterance.trim()
    )
}
