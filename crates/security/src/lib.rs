//! Request-admission policies for curhat.
//!
//! Provides:
//! - **Safety gate**: crisis keyword detection with a fixed override reply
//! - **Rate limiter**: per-client sliding-window admission control

pub mod rate_limit;
pub mod safety;

pub use rate_limit::{Admission, RateLimiter};
pub use safety::{SafetyGate, SafetyVerdict};
