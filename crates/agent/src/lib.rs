//! The reasoning pipeline: the heart of curhat.
//!
//! One request flows through a fixed sequence of stages:
//!
//! 1. **Admit** the client (rate limiter) and short-circuit on a cache hit
//! 2. **Screen** for crisis language before any network call
//! 3. **Classify** language and intent from lexical cues
//! 4. **Extract facts** from the session memory plus the new message
//! 5. **Retrieve** reference snippets keyed off those facts
//! 6. **Compose** the prompt and **generate**, with a quality gate
//! 7. **Commit** the turn to the session (compacting it when it grows long)
//!    and cache the reply
//!
//! Every upstream failure degrades to a canned reply or an empty stage
//! output; the caller always gets text back.

pub mod classify;
pub mod engine;
pub mod facts;
mod generation;
pub mod prompt;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use classify::{IntentClassifier, LanguageClassifier};
pub use engine::ReasoningEngine;
pub use facts::FactExtractor;
pub use prompt::{PromptComposer, PromptInput};
pub use summarizer::Summarizer;
