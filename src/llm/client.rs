//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the completion services the
//! conversation graph talks to:
//! - **OpenAI**: chat completions API, including compatible endpoints
//! - **Ollama**: local inference through an Ollama server

use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Model used by both memory responders unless configured otherwise
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature used by both memory responders unless configured otherwise
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Cargo feature | Notes |
/// |----------|---------------|-------|
/// | OpenAI | `openai` (default) | Any OpenAI-compatible endpoint |
/// | Ollama | `ollama` | Local inference |
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     temperature: 0.0,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    ///     temperature: 0.0,
    /// };
    /// ```
    Ollama {
        base_url: String,
        model: String,
        temperature: f32,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's Cargo feature is not compiled in.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *temperature,
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                temperature,
            } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), *temperature)
                    .await?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::LLM(format!(
                "{} provider is not enabled; rebuild with `--features {}`",
                other.name(),
                other.feature_name()
            ))),
        }
    }

    /// Check if this provider was compiled into the binary
    pub fn is_enabled(&self) -> bool {
        match self {
            Provider::OpenAI { .. } => cfg!(feature = "openai"),
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Cargo feature gating this provider
    pub fn feature_name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "openai",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Model identifier requested from the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai() -> Provider {
        Provider::OpenAI {
            api_key: "test".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    fn ollama() -> Provider {
        Provider::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(openai().name(), "OpenAI");
        assert_eq!(ollama().name(), "Ollama");
    }

    #[test]
    fn test_provider_model() {
        assert_eq!(openai().model(), "gpt-4o-mini");
        assert_eq!(ollama().model(), "llama3.2");
    }

    #[test]
    fn test_provider_enabled_matches_features() {
        assert_eq!(openai().is_enabled(), cfg!(feature = "openai"));
        assert_eq!(ollama().is_enabled(), cfg!(feature = "ollama"));
    }

    #[cfg(not(feature = "ollama"))]
    #[tokio::test]
    async fn test_disabled_provider_returns_helpful_error() {
        let result = ollama().create_client().await;

        // Box<dyn LLMClient> doesn't implement Debug
        let err = match result {
            Ok(_) => panic!("Expected error"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("not enabled"));
        assert!(err.contains("--features ollama"));
    }

    #[cfg(feature = "openai")]
    #[tokio::test]
    async fn test_openai_client_reports_model() {
        let client = openai().create_client().await.unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}
