//! HTTP knowledge source: fetches reference pages by URL.

use std::time::Duration;

use async_trait::async_trait;
use curhat_core::error::{Error, KnowledgeError};
use curhat_core::knowledge::KnowledgeSource;
use tracing::debug;

/// Fetches raw page text over HTTP(S).
pub struct HttpKnowledgeSource {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpKnowledgeSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build knowledge HTTP client: {e}"),
            })?;

        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl KnowledgeSource for HttpKnowledgeSource {
    async fn fetch(&self, identifier: &str) -> Result<String, KnowledgeError> {
        debug!(source = %identifier, "Fetching knowledge source");

        let response = self.http.get(identifier).send().await.map_err(|e| {
            if e.is_timeout() {
                KnowledgeError::Timeout {
                    source_id: identifier.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                KnowledgeError::Network {
                    source_id: identifier.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(KnowledgeError::Status {
                source_id: identifier.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|e| KnowledgeError::Network {
            source_id: identifier.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let source = HttpKnowledgeSource::new("curhat-test", Duration::from_secs(2)).unwrap();
        let err = source.fetch("http://127.0.0.1:9/nothing").await.unwrap_err();
        assert!(matches!(
            err,
            KnowledgeError::Network { .. } | KnowledgeError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn invalid_identifier_is_an_error() {
        let source = HttpKnowledgeSource::new("curhat-test", Duration::from_secs(2)).unwrap();
        assert!(source.fetch("not a url").await.is_err());
    }
}
