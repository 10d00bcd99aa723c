//! The reasoning engine: one request in, one reply out.
//!
//! Terminal branches, in order: invalid input, throttled, cached, crisis,
//! generated, fallback. Only the last two touch the session, and they do so
//! while holding that client's session lock from load to commit, so a turn
//! is either fully recorded or not at all.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use curhat_config::AppConfig;
use curhat_core::error::PipelineError;
use curhat_core::knowledge::KnowledgeSource;
use curhat_core::provider::{Provider, ProviderRequest};
use curhat_core::{ClientId, Intent, Language, Reply, ReplyKind, Session};
use curhat_knowledge::{HttpKnowledgeSource, KnowledgeRetriever, RetrieverSettings};
use curhat_memory::{ResponseCache, SessionStore};
use curhat_security::{Admission, RateLimiter, SafetyGate, SafetyVerdict};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::classify::{IntentClassifier, LanguageClassifier};
use crate::facts::FactExtractor;
use crate::generation::complete_within;
use crate::prompt::{PromptComposer, PromptInput};
use crate::summarizer::Summarizer;

/// Reply to an empty message.
pub fn share_more_reply(language: Language) -> &'static str {
    match language {
        Language::Id => {
            "Ceritakan sedikit lebih banyak tentang apa yang sedang kamu rasakan, \
             supaya aku bisa memahami dan membantu."
        }
        Language::En => {
            "Please share a little more about what's on your mind, so I can understand and help."
        }
    }
}

/// Reply to a throttled client.
pub fn throttle_reply(language: Language) -> &'static str {
    match language {
        Language::Id => "Kamu mengirim pesan terlalu cepat. Tunggu sebentar sebelum mencoba lagi, ya.",
        Language::En => "You're sending messages very quickly. Please wait a moment and try again.",
    }
}

/// Reply used when generation fails, times out, or comes back too weak.
pub fn fallback_reply(language: Language) -> &'static str {
    match language {
        Language::Id => {
            "Aku mendengarmu, dan apa yang kamu alami itu penting. Tarik napas perlahan. \
             Aku di sini untuk mendengarkan kapan pun kamu ingin bercerita lagi."
        }
        Language::En => {
            "I hear you, and what you're going through matters. Take a slow breath. \
             I'm here to listen whenever you want to tell me more."
        }
    }
}

/// Accept `text` only if it is at least `min_chars` characters once trimmed.
fn quality_gate(text: &str, min_chars: usize) -> Result<String, PipelineError> {
    let text = text.trim();
    let len = text.chars().count();
    if len < min_chars {
        return Err(PipelineError::WeakResponse { len, min: min_chars });
    }
    Ok(text.to_string())
}

/// Per-request limits and generation options, resolved from config once.
#[derive(Debug, Clone)]
struct Limits {
    default_language: Language,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    min_reply_chars: usize,
    cache_ttl: Duration,
    history_threshold: usize,
    generation_timeout: Duration,
    request_deadline: Duration,
}

impl Limits {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            default_language: config.language.default,
            model: config.provider.model.clone(),
            system_prompt: config.provider.system_prompt.clone(),
            temperature: config.provider.temperature,
            max_tokens: config.provider.max_tokens,
            min_reply_chars: config.generation.min_reply_chars,
            cache_ttl: config.cache.ttl(),
            history_threshold: config.session.history_threshold,
            generation_timeout: Duration::from_secs(config.timeouts.generation_secs),
            request_deadline: Duration::from_secs(config.timeouts.request_deadline_secs),
        }
    }
}

/// Orchestrates the pipeline and owns all shared request state.
pub struct ReasoningEngine {
    provider: Arc<dyn Provider>,
    limiter: RateLimiter,
    cache: ResponseCache,
    safety: SafetyGate,
    sessions: SessionStore,
    language: LanguageClassifier,
    intent: IntentClassifier,
    facts: FactExtractor,
    retriever: KnowledgeRetriever,
    composer: PromptComposer,
    summarizer: Summarizer,
    limits: Limits,
}

impl ReasoningEngine {
    /// Wire the pipeline from configuration and the two external services.
    pub fn new(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeSource>,
    ) -> Self {
        let limits = Limits::from_config(config);

        let facts = FactExtractor::new(provider.clone(), &limits.model)
            .with_temperature(config.generation.fact_temperature)
            .with_max_tokens(config.generation.fact_max_tokens)
            .with_timeout(Duration::from_secs(config.timeouts.fact_extraction_secs));

        let summarizer = Summarizer::new(
            provider.clone(),
            &limits.model,
            config.session.summary_max_chars,
        )
        .with_temperature(config.generation.summary_temperature)
        .with_max_tokens(config.generation.summary_max_tokens)
        .with_timeout(Duration::from_secs(config.timeouts.summarization_secs));

        let retriever = KnowledgeRetriever::new(
            knowledge,
            RetrieverSettings {
                sources: config.knowledge.sources.clone(),
                min_snippets: config.knowledge.min_snippets,
                max_snippets: config.knowledge.max_snippets,
                min_paragraph_chars: config.knowledge.min_paragraph_chars,
                concurrency: config.knowledge.concurrency,
                fetch_timeout: Duration::from_secs(config.timeouts.knowledge_fetch_secs),
            },
        );

        Self {
            provider,
            limiter: RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window()),
            cache: ResponseCache::new(config.cache.max_entries),
            safety: SafetyGate::new(&config.safety.crisis_keywords),
            sessions: SessionStore::new(config.session.idle_ttl()),
            language: LanguageClassifier::new(limits.default_language),
            intent: IntentClassifier::new(),
            facts,
            retriever,
            composer: PromptComposer::new(),
            summarizer,
            limits,
        }
    }

    /// Build the engine with the configured provider and HTTP knowledge source.
    pub fn from_config(config: &AppConfig) -> Result<Self, curhat_core::Error> {
        let provider = curhat_providers::build_from_config(config)?;
        let knowledge = HttpKnowledgeSource::new(
            &config.knowledge.user_agent,
            Duration::from_secs(config.timeouts.knowledge_fetch_secs),
        )?;
        Ok(Self::new(config, provider, Arc::new(knowledge)))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Drop expired cache entries, idle sessions, and idle rate-limit windows.
    pub async fn sweep(&self, now: Instant) {
        let cache_entries = self.cache.prune_expired(now).await;
        let sessions = self.sessions.sweep_idle(Utc::now()).await;
        let rate_windows = self.limiter.sweep(now);
        debug!(cache_entries, sessions, rate_windows, "Maintenance sweep finished");
    }

    /// Run [`ReasoningEngine::sweep`] every `every` until the handle is aborted.
    pub fn spawn_maintenance(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.sweep(Instant::now()).await;
            }
        })
    }

    /// Answer `utterance` from `client`. Always produces reply text.
    pub async fn respond(&self, client: &ClientId, utterance: &str, now: Instant) -> Reply {
        let default_language = self.limits.default_language;

        if utterance.trim().is_empty() {
            debug!(client = %client, error = %PipelineError::InvalidInput, "Short-circuit");
            return Reply::new(
                share_more_reply(default_language),
                ReplyKind::InvalidInput,
                None,
            );
        }

        if self.limiter.admit(client, now) == Admission::Throttled {
            let error = PipelineError::RateLimitExceeded {
                client: client.to_string(),
            };
            warn!(error = %error, "Request throttled");
            return Reply::new(throttle_reply(default_language), ReplyKind::Throttled, None);
        }

        if let Some(text) = self.cache.get(utterance, now).await {
            info!(client = %client, reply_len = text.len(), kind = "cached", "Reply served");
            return Reply::new(text, ReplyKind::Cached, None);
        }

        let language = self.language.classify(utterance);

        if let SafetyVerdict::CrisisDetected { .. } = self.safety.check(utterance) {
            let text = SafetyGate::crisis_reply(language);
            warn!(client = %client, language = %language, "Crisis language detected, overriding pipeline");
            self.cache.put(utterance, text, self.limits.cache_ttl, now).await;
            return Reply::new(text, ReplyKind::Crisis, Some(language));
        }

        let mut session = self.sessions.lock(client).await;

        let outcome = match tokio::time::timeout(
            self.limits.request_deadline,
            self.reason(utterance, language, &session),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(PipelineError::DeadlineExceeded {
                timeout_secs: self.limits.request_deadline.as_secs(),
            }),
        };

        let (text, kind) = match outcome {
            Ok(text) => (text, ReplyKind::Generated),
            Err(e) => {
                warn!(client = %client, error = %e, "Generation rejected, using fallback reply");
                (fallback_reply(language).to_string(), ReplyKind::Fallback)
            }
        };

        let next = self.commit(&session, utterance, &text).await;
        *session = next;
        drop(session);

        self.cache.put(utterance, &text, self.limits.cache_ttl, now).await;
        info!(
            client = %client,
            language = %language,
            reply_len = text.len(),
            kind = ?kind,
            "Reply served"
        );
        Reply::new(text, kind, Some(language))
    }

    /// Classification through the quality gate. Reads the session, never writes it.
    async fn reason(
        &self,
        utterance: &str,
        language: Language,
        session: &Session,
    ) -> Result<String, PipelineError> {
        let intent: Intent = self.intent.classify(utterance);
        debug!(intent = %intent, language = %language, "Message classified");

        let facts = self.facts.extract(utterance, &session.context()).await;
        let knowledge = self.retriever.retrieve(&facts).await;

        let prompt = self.composer.compose(&PromptInput {
            utterance,
            facts: &facts,
            knowledge: &knowledge,
            intent,
            language,
            last_reply: &session.last_reply,
        });

        let request = ProviderRequest::prompt(
            &self.limits.model,
            &self.limits.system_prompt,
            prompt,
            self.limits.temperature,
            self.limits.max_tokens,
        );
        let text = complete_within(
            self.provider.as_ref(),
            request,
            self.limits.generation_timeout,
        )
        .await?;

        quality_gate(&text, self.limits.min_reply_chars)
    }

    /// The session after this turn, compacted when history grew past the threshold.
    async fn commit(&self, session: &Session, utterance: &str, reply: &str) -> Session {
        let mut next = session.clone();
        next.record_turn(utterance, reply, Utc::now());

        if next.needs_compaction(self.limits.history_threshold) {
            let summary = self.summarizer.summarize(&next).await;
            next.compact(summary, Utc::now());
        }
        next
    }
}
