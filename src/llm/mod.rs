//! LLM Provider Clients and Abstractions
//!
//! Both memory responders send a single rendered prompt to a completion
//! service. This module hides which service that is behind [`LLMClient`].
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and compatible endpoints (default)
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use memroute::llm::{Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
//!
//! let provider = Provider::OpenAI {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     api_base: "https://api.openai.com/v1".to_string(),
//!     model: DEFAULT_MODEL.to_string(),
//!     temperature: DEFAULT_TEMPERATURE,
//! };
//! let client = provider.create_client().await?;
//! let reply = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
