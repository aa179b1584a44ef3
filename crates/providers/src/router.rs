//! Provider selection: builds the configured language-model backend.

use std::sync::Arc;
use openclaw_core::error::ProviderError;
use openclaw_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `model.provider`.
///
/// Every supported backend speaks the OpenAI-compatible protocol; the name
/// only picks defaults. An explicit `model.api_url` always wins.
pub fn build_from_config(
    config: &openclaw_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.model.provider.as_str();
    let api_key = config.model.api_key.clone().unwrap_or_else(|| {
        if name == "ollama" {
            "ollama".into()
        } else {
            String::new()
        }
    });

    let base_url = if config.model.api_url.is_empty() {
        default_base_url(name).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider '{name}' and no model.api_url set"
            ))
        })?
    } else {
        config.model.api_url.clone()
    };

    tracing::debug!(provider = name, url = %base_url, "Building provider");

    let provider =
        OpenAiCompatProvider::new(name, base_url, api_key, config.timeouts.model_secs)?;
    Ok(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "ollama" => "http://localhost:11434/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(default_base_url("ollama").unwrap().contains("localhost:11434"));
        assert!(default_base_url("mystery").is_none());
    }

    #[test]
    fn build_from_default_config() {
        let config = openclaw_config::AppConfig::default();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn unknown_provider_without_url_is_rejected() {
        let mut config = openclaw_config::AppConfig::default();
        config.model.provider = "mystery".into();
        config.model.api_url = String::new();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn unknown_provider_with_url_is_accepted() {
        let mut config = openclaw_config::AppConfig::default();
        config.model.provider = "lab-box".into();
        config.model.api_url = "http://10.0.0.5:8000/v1".into();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "lab-box");
    }
}
