//! Generation Service implementations for curhat.
//!
//! All providers implement the `curhat_core::Provider` trait.
//! `build_from_config` selects and constructs the configured one.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
