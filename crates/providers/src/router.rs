//! Provider construction from configuration.

use std::sync::Arc;
use curhat_core::error::ProviderError;
use curhat_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the Generation Service from configuration.
///
/// Fails when no API key is available and the endpoint is not a local one.
pub fn build_from_config(
    config: &curhat_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = &config.provider.name;
    let api_key = match (&config.api_key, is_local(name)) {
        (Some(key), _) => key.clone(),
        (None, true) => String::new(),
        (None, false) => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key for provider '{name}' (set CURHAT_API_KEY or DEEPSEEK_API_KEY)"
            )));
        }
    };

    let provider = OpenAiCompatProvider::new(name, &config.provider.api_url, api_key)?;
    Ok(Arc::new(provider))
}

/// Providers that run on the local machine and need no key.
fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = curhat_config::AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn build_with_key() {
        let config = curhat_config::AppConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "deepseek");
    }

    #[test]
    fn local_provider_needs_no_key() {
        let mut config = curhat_config::AppConfig::default();
        config.provider.name = "ollama".into();
        config.provider.api_url = "http://localhost:11434/v1".into();
        assert!(build_from_config(&config).is_ok());
    }
}
