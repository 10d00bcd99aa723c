//! # curhat core
//!
//! Domain types, traits, and error definitions for the curhat counseling
//! pipeline. This crate has **no framework dependencies**: it defines the
//! domain model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The two external capabilities the pipeline consumes are traits here:
//! - [`Provider`]: the Generation Service (prompt → text)
//! - [`KnowledgeSource`]: identifier → raw document text
//!
//! Implementations live in `curhat-providers` and `curhat-knowledge`, which
//! keeps the reasoning pipeline testable with scripted stand-ins.

pub mod error;
pub mod knowledge;
pub mod message;
pub mod provider;
pub mod reply;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, PipelineError, ProviderError, Result};
pub use knowledge::{KnowledgeSnippet, KnowledgeSource};
pub use message::{Message, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use reply::{ClientId, Intent, Language, Reply, ReplyKind};
pub use session::Session;
