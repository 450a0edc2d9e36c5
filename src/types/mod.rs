use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============= Conversation State =============

/// The record that flows through the conversation graph for one turn.
///
/// Every field defaults to empty, so a state deserialized from a partial
/// mapping (e.g. `{"user_message": "hi"}`) is always usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    /// Input text of the current turn
    pub user_message: String,
    /// The most recently processed user message (short-term memory, capacity one)
    pub last_message: String,
    /// Newline-joined log of remembered statements (long-term memory, append-only)
    pub memory_context: String,
    /// Routing label chosen by the controller for the current turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// Model reply for the current turn
    pub response: String,
    /// Fact recorded by the long-term responder this turn, persisted to the
    /// fact store only once the turn is checkpointed
    #[serde(skip)]
    pub pending_fact: Option<String>,
}

impl ConversationState {
    /// Create a state carrying only the user's message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Default::default()
        }
    }

    /// Replace the user message, keeping remembered fields.
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = user_message.into();
        self
    }

    pub fn with_last_message(mut self, last_message: impl Into<String>) -> Self {
        self.last_message = last_message.into();
        self
    }

    pub fn with_memory_context(mut self, memory_context: impl Into<String>) -> Self {
        self.memory_context = memory_context.into();
        self
    }
}

// ============= Routing =============

/// The two branches a turn can take after the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Short-term memory responder
    Stm,
    /// Long-term memory responder
    Ltm,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Stm => "stm",
            Route::Ltm => "ltm",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stm" => Ok(Route::Stm),
            "ltm" => Ok(Route::Ltm),
            other => Err(AppError::InvalidInput(format!("Unknown route '{}'", other))),
        }
    }
}

// ============= Memory Types =============

/// A single remembered statement in the long-term fact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFact {
    pub id: String,
    pub namespace: Vec<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
