//! Knowledge Source trait: external reference documents.
//!
//! A source turns an identifier (in practice a URL) into raw document text.
//! Any failure means "no content from this source"; the retriever skips it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::KnowledgeError;

/// A paragraph of reference text plus where it came from.
///
/// Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    pub source: String,
    pub text: String,
}

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Fetch the raw document for `identifier`.
    async fn fetch(&self, identifier: &str) -> std::result::Result<String, KnowledgeError>;
}
