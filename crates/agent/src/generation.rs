//! Bounded calls to the Generation Service.

use std::time::Duration;

use curhat_core::error::ProviderError;
use curhat_core::provider::{Provider, ProviderRequest};

/// Run one completion under `timeout`. An elapsed timeout becomes
/// [`ProviderError::Timeout`]; the in-flight call is dropped.
pub(crate) async fn complete_within(
    provider: &dyn Provider,
    request: ProviderRequest,
    timeout: Duration,
) -> Result<String, ProviderError> {
    match tokio::time::timeout(timeout, provider.complete(request)).await {
        Ok(response) => Ok(response?.text),
        Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
    }
}
