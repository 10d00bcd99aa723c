//! Knowledge retrieval for curhat.
//!
//! Facts → keyword set → concurrent fetches over a fixed source list →
//! matching paragraphs, stopping as soon as enough have been found.

pub mod http_source;
pub mod keywords;
pub mod paragraphs;
pub mod retriever;

pub use http_source::HttpKnowledgeSource;
pub use keywords::keywords_for;
pub use paragraphs::paragraphs;
pub use retriever::{KnowledgeRetriever, RetrieverSettings};
