//! Process-local state for curhat.
//!
//! Nothing here survives a restart.

pub mod cache;
pub mod session_store;

pub use cache::{ResponseCache, cache_key};
pub use session_store::SessionStore;
