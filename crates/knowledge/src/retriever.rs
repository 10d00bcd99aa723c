//! Knowledge retriever: concurrent fetch-and-filter with early stop.
//!
//! Sources are fetched with bounded concurrency. As each fetch completes its
//! matching paragraphs are collected; once `min_snippets` are in hand the
//! remaining fetches are dropped, which cancels them. A failed or slow
//! source contributes nothing and never fails the retrieval.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use curhat_core::error::{KnowledgeError, PipelineError};
use curhat_core::knowledge::{KnowledgeSnippet, KnowledgeSource};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::keywords::keywords_for;
use crate::paragraphs::matching_paragraphs;

#[derive(Debug, Clone)]
pub struct RetrieverSettings {
    /// Ordered source identifiers
    pub sources: Vec<String>,
    pub min_snippets: usize,
    pub max_snippets: usize,
    pub min_paragraph_chars: usize,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for RetrieverSettings {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            min_snippets: 2,
            max_snippets: 3,
            min_paragraph_chars: 80,
            concurrency: 4,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

pub struct KnowledgeRetriever {
    source: Arc<dyn KnowledgeSource>,
    settings: RetrieverSettings,
}

impl KnowledgeRetriever {
    pub fn new(source: Arc<dyn KnowledgeSource>, settings: RetrieverSettings) -> Self {
        Self { source, settings }
    }

    /// Aggregated snippet text for `facts`; empty when nothing matched.
    pub async fn retrieve(&self, facts: &str) -> String {
        self.collect(facts)
            .await
            .into_iter()
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The accepted snippets, at most `max_snippets` of them.
    pub async fn collect(&self, facts: &str) -> Vec<KnowledgeSnippet> {
        let keywords = keywords_for(facts);
        let timeout = self.settings.fetch_timeout;
        debug!(keywords = ?keywords, sources = self.settings.sources.len(), "Retrieving knowledge");

        let fetches = futures::stream::iter(self.settings.sources.iter().cloned())
            .map(|id| {
                let source = self.source.clone();
                async move {
                    let result = match tokio::time::timeout(timeout, source.fetch(&id)).await {
                        Ok(result) => result,
                        Err(_) => Err(KnowledgeError::Timeout {
                            source_id: id.clone(),
                            timeout_secs: timeout.as_secs(),
                        }),
                    };
                    (id, result)
                }
            })
            .buffer_unordered(self.settings.concurrency.max(1));
        let mut fetches = pin!(fetches);

        let mut snippets: Vec<KnowledgeSnippet> = Vec::new();
        while let Some((id, result)) = fetches.next().await {
            match result {
                Ok(document) => {
                    let found = matching_paragraphs(
                        &document,
                        &keywords,
                        self.settings.min_paragraph_chars,
                    );
                    debug!(source = %id, matched = found.len(), "Knowledge source scanned");
                    snippets.extend(found.into_iter().map(|text| KnowledgeSnippet {
                        source: id.clone(),
                        text,
                    }));
                }
                Err(error) => {
                    let skipped = PipelineError::UpstreamKnowledge {
                        source_id: id,
                        error,
                    };
                    warn!(error = %skipped, "Knowledge source skipped");
                }
            }

            if snippets.len() >= self.settings.min_snippets {
                break;
            }
        }

        snippets.truncate(self.settings.max_snippets);
        info!(snippets = snippets.len(), "Knowledge retrieval finished");
        snippets
    }
}
