//! History compaction.
//!
//! Folds the previous summary and the raw history into one bounded summary.
//! When the Generation Service fails, the tail of the raw memory is kept
//! instead, so the result is always non-empty for a non-empty session and
//! never longer than `max_chars`.

use std::sync::Arc;
use std::time::Duration;

use curhat_core::error::PipelineError;
use curhat_core::provider::{Provider, ProviderRequest};
use curhat_core::session::{clamp_head, clamp_tail};
use curhat_core::Session;
use tracing::{info, warn};

use crate::generation::complete_within;

const SYSTEM: &str = "You write concise, neutral notes about counseling conversations.";

pub struct Summarizer {
    provider: Arc<dyn Provider>,
    model: String,
    max_chars: usize,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, max_chars: usize) -> Self {
        Self {
            provider,
            model: model.into(),
            max_chars,
            temperature: 0.3,
            max_tokens: 384,
            timeout: Duration::from_secs(20),
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

    /// A new summary covering `session.summary` and `session.history`.
    pub async fn summarize(&self, session: &Session) -> String {
        match self.try_summarize(session).await {
            Ok(summary) => {
                info!(summary_len = summary.chars().count(), "History compacted");
                summary
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, keeping truncated history");
                clamp_tail(&session.context(), self.max_chars)
            }
        }
    }

    pub async fn try_summarize(&self, session: &Session) -> Result<String, PipelineError> {
        let request = ProviderRequest::prompt(
            &self.model,
            SYSTEM,
            self.summary_prompt(session),
            self.temperature,
            self.max_tokens,
        );
        let text = complete_within(self.provider.as_ref(), request, self.timeout).await?;

        let summary = clamp_head(text.trim(), self.max_chars);
        if summary.is_empty() {
            return Err(PipelineError::WeakResponse { len: 0, min: 1 });
        }
        Ok(summary)
    }

    fn summary_prompt(&self, session: &Session) -> String {
        format!(
            "Summarize the counseling conversation below as notes for the next session.\n\
             - Keep the user's situation, feelings, and anything they decided.\n\
             - Do not add advice.\n\
             - Use at most {} characters.\n\n\
             Previous summary:\n{}\n\n\
             Conversation:\n{}\n\n\
             Summary:",
            self.max_chars,
            session.summary.trim(),
            session.transcript()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, Step, reply};
    use chrono::Utc;
    use curhat_core::error::ProviderError;

    fn session() -> Session {
        let mut s = Session::new(Utc::now());
        s.summary = "User lost their job last month.".into();
        s.record_turn("Aku capek banget", "Kedengarannya berat sekali.", Utc::now());
        s.record_turn("Aku nggak bisa tidur", "Sudah berapa lama?", Utc::now());
        s
    }

    #[tokio::test]
    async fn prompt_covers_previous_summary_and_history() {
        let provider = ScriptedProvider::new(vec![reply("User is exhausted and sleeping badly.")]);
        let summarizer = Summarizer::new(provider.clone(), "m", 500);

        let summary = summarizer.summarize(&session()).await;
        assert_eq!(summary, "User is exhausted and sleeping badly.");

        let prompt = provider.prompts().remove(0);
        assert!(prompt.contains("User lost their job last month."));
        assert!(prompt.contains("user: Aku nggak bisa tidur"));
    }

    #[tokio::test]
    async fn generated_summary_is_clamped() {
        let provider = ScriptedProvider::new(vec![reply(&"x".repeat(200))]);
        let summarizer = Summarizer::new(provider, "m", 50);
        assert_eq!(summarizer.summarize(&session()).await.chars().count(), 50);
    }

    #[tokio::test]
    async fn failure_keeps_tail_of_raw_memory() {
        let provider = ScriptedProvider::new(vec![Step::Fail(ProviderError::Network("down".into()))]);
        let summarizer = Summarizer::new(provider, "m", 40);
        let s = session();

        let summary = summarizer.summarize(&s).await;
        assert_eq!(summary.chars().count(), 40);
        assert!(s.context().ends_with(&summary));
    }

    #[tokio::test]
    async fn empty_generation_counts_as_failure() {
        let provider = ScriptedProvider::new(vec![reply("   ")]);
        let summarizer = Summarizer::new(provider, "m", 1000);
        let s = session();
        assert_eq!(summarizer.summarize(&s).await, s.context());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back() {
        let provider = ScriptedProvider::new(vec![Step::Hang]);
        let summarizer = Summarizer::new(provider, "m", 1000).with_timeout(Duration::from_secs(1));
        let s = session();
        assert_eq!(summarizer.summarize(&s).await, s.context());
    }
}
