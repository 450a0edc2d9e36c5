//! # memroute - keyword-routed conversational memory
//!
//! A small conversational graph: a controller inspects each user message and
//! routes it to one of two responders, each backed by a different kind of
//! memory.
//!
//! - **STM** (short-term memory) sees the previous message of the same thread.
//! - **LTM** (long-term memory) sees a log of facts the user asked it to
//!   remember, and appends to that log.
//!
//! Messages containing `"remember"` or `"recall"` (case-insensitive) take the
//! LTM branch; everything else goes to STM.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use memroute::{ConversationApp, Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> memroute::Result<()> {
//!     let provider = Provider::OpenAI {
//!         api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
//!         api_base: "https://api.openai.com/v1".to_string(),
//!         model: DEFAULT_MODEL.to_string(),
//!         temperature: DEFAULT_TEMPERATURE,
//!     };
//!     let llm = Arc::from(provider.create_client().await?);
//!     let app = ConversationApp::in_memory(llm)?;
//!
//!     let turn = app.invoke("session-1", "Please remember my name is Ada").await?;
//!     println!("[{}] {}", turn.route, turn.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI API and compatible endpoints (default) |
//! | `ollama` | Ollama local inference |
//! | `all-llm` | Both providers |
//!
//! ## Modules
//!
//! - [`agents`] - Controller and the two memory responders
//! - [`graph`] - State graph executor
//! - [`memory`] - Checkpointer and long-term fact store
//! - [`conversation`] - Graph wiring plus per-thread checkpointing
//! - [`llm`] - LLM client implementations
//! - [`config`] - `memroute.toml` loading and validation
//! - [`types`] - Conversation state and error handling

/// Keyword controller and STM/LTM responders.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// TOML configuration.
pub mod config;
/// Conversation runtime tying the graph to its memory backends.
pub mod conversation;
/// State graph engine.
pub mod graph;
/// LLM provider clients and abstractions.
pub mod llm;
/// Short-term checkpoints and long-term facts.
pub mod memory;
/// Core types (state, routes, errors).
pub mod types;

// Re-export commonly used types
pub use config::{MemrouteConfig, ProviderKind};
pub use conversation::{ConversationApp, ConversationAppBuilder, TurnOutput};
pub use graph::{CompiledGraph, StateGraph, END};
pub use llm::{LLMClient, Provider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
pub use memory::{Checkpointer, FactStore, InMemoryStore, MemorySaver, RunConfig};
pub use types::{AppError, ConversationState, MemoryFact, Result, Route};
