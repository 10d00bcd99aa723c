//! Shared test doubles for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use curhat_core::error::{KnowledgeError, ProviderError};
use curhat_core::knowledge::KnowledgeSource;
use curhat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(ProviderError),
    /// Never answers within any realistic timeout.
    Hang,
}

pub fn reply(text: &str) -> Step {
    Step::Reply(text.to_string())
}

/// A provider that plays back a script of outcomes, then repeats `otherwise`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    otherwise: Step,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    /// Plays `script`, then fails every further call.
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Self::with_otherwise(
            script,
            Step::Fail(ProviderError::ApiError {
                status_code: 503,
                message: "script exhausted".into(),
            }),
        )
    }

    /// Answers every call with `text`.
    pub fn always(text: &str) -> Arc<Self> {
        Self::with_otherwise(Vec::new(), reply(text))
    }

    pub fn with_otherwise(script: Vec<Step>, otherwise: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            otherwise,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The user prompt of every call so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.user_prompt().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());

        match step {
            Step::Reply(text) => Ok(ProviderResponse {
                text,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model,
            }),
            Step::Fail(err) => Err(err),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::Timeout(3600))
            }
        }
    }
}

/// A knowledge source backed by a fixed map; unknown identifiers fail.
pub struct StaticSource {
    docs: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(docs: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            docs: docs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KnowledgeSource for StaticSource {
    async fn fetch(&self, identifier: &str) -> Result<String, KnowledgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.docs
            .get(identifier)
            .cloned()
            .ok_or_else(|| KnowledgeError::Status {
                source_id: identifier.to_string(),
                status: 404,
            })
    }
}
