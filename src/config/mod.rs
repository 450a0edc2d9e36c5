//! TOML-based configuration for memroute
//!
//! Declares the model provider, memory namespaces and logging via a TOML file
//! (`memroute.toml`). Every field has a default, so an empty file (or no file
//! at all, see [`MemrouteConfig::load_or_default`]) is a valid configuration.

use crate::conversation::MIN_RECURSION_LIMIT;
use crate::llm::{Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::memory::{DEFAULT_NAMESPACE, DEFAULT_USER_ID};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "memroute.toml";

/// Root configuration structure loaded from memroute.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemrouteConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= LLM Configuration =============

/// Which completion backend to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown provider '{}' (expected 'openai' or 'ollama')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable containing the OpenAI API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            api_base: default_openai_base(),
            ollama_url: default_ollama_url(),
        }
    }
}

// ============= Memory Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Root namespace for long-term facts
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// User whose facts are read and written
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Maximum node executions per turn
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_recursion_limit() -> usize {
    crate::graph::DEFAULT_RECURSION_LIMIT
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            user_id: default_user_id(),
            recursion_limit: default_recursion_limit(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl MemrouteConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::FileNotFound(missing)) => {
                tracing::info!("No configuration at {:?}, using defaults", missing);
                let config = Self::default();
                config.validate_structure()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse and structurally validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MemrouteConfig = toml::from_str(content)?;
        config.validate_structure()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Full validation, including that the referenced API key is available
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_structure()?;

        if self.llm.provider == ProviderKind::OpenAI {
            self.validate_env_var(&self.llm.api_key_env)?;
        }

        Ok(())
    }

    /// Checks that don't depend on the environment
    pub fn validate_structure(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        for (field, value) in [
            ("memory.namespace", &self.memory.namespace),
            ("memory.user_id", &self.memory.user_id),
        ] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be non-empty and must not contain '/'",
                    field
                )));
            }
        }

        if self.memory.recursion_limit < MIN_RECURSION_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "memory.recursion_limit must be at least {}, got {}",
                MIN_RECURSION_LIMIT, self.memory.recursion_limit
            )));
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        self.resolve_env(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    /// Resolve an environment variable reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|value| !value.is_empty())
    }

    /// Build the provider description for the configured backend
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        let llm = &self.llm;
        match llm.provider {
            ProviderKind::OpenAI => {
                let api_key = self
                    .resolve_env(&llm.api_key_env)
                    .ok_or_else(|| ConfigError::MissingEnvVar(llm.api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: llm.api_base.clone(),
                    model: llm.model.clone(),
                    temperature: llm.temperature,
                })
            }
            ProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: llm.ollama_url.clone(),
                model: llm.model.clone(),
                temperature: llm.temperature,
            }),
        }
    }
}
