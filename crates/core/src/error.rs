//! Error types for the curhat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`PipelineError`] is the
//! taxonomy the reasoning engine matches on when it picks a fallback branch.

use thiserror::Error;

/// The top-level error type for all curhat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation Service errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge Source errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Pipeline errors ---
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the Generation Service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Response missing generated text: {0}")]
    MalformedResponse(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Failures of a single Knowledge Source fetch.
#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Fetch of {source_id} timed out after {timeout_secs}s")]
    Timeout { source_id: String, timeout_secs: u64 },

    #[error("Fetch of {source_id} returned status {status}")]
    Status { source_id: String, status: u16 },

    #[error("Fetch of {source_id} failed: {reason}")]
    Network { source_id: String, reason: String },
}

/// Why a request left the happy path.
///
/// None of these surface to the caller as a failure: each one maps to a
/// canned reply or a degraded stage output.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Empty message")]
    InvalidInput,

    #[error("Rate limit exceeded for client {client}")]
    RateLimitExceeded { client: String },

    #[error("Generation failed: {0}")]
    UpstreamGeneration(#[from] ProviderError),

    #[error("Knowledge source {source_id} skipped: {error}")]
    UpstreamKnowledge {
        source_id: String,
        error: KnowledgeError,
    },

    #[error("Generated reply too short ({len} < {min} chars)")]
    WeakResponse { len: usize, min: usize },

    #[error("Request deadline of {timeout_secs}s exceeded")]
    DeadlineExceeded { timeout_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 503,
            message: "Service unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service unavailable"));
    }

    #[test]
    fn weak_response_reports_lengths() {
        let err = PipelineError::WeakResponse { len: 12, min: 40 };
        let text = err.to_string();
        assert!(text.contains("12"));
        assert!(text.contains("40"));
    }

    #[test]
    fn provider_error_converts_into_pipeline_error() {
        let err: PipelineError = ProviderError::Timeout(30).into();
        assert!(matches!(
            err,
            PipelineError::UpstreamGeneration(ProviderError::Timeout(30))
        ));
    }

    #[test]
    fn knowledge_error_names_source() {
        let err = KnowledgeError::Status {
            source_id: "https://example.org/a".into(),
            status: 404,
        };
        assert!(err.to_string().contains("example.org/a"));
        assert!(err.to_string().contains("404"));
    }
}
