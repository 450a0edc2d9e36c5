//! Memory backends for conversation state.
//!
//! Two stores back a conversation:
//! - [`Checkpointer`] keeps the short-term state of each thread (session), so
//!   a later turn resumes with the previous `last_message`.
//! - [`FactStore`] keeps long-term facts per user namespace. Facts survive
//!   across threads for as long as the store lives.
//!
//! Both are traits so callers can inject their own storage; the in-memory
//! implementations are non-durable.

pub mod checkpoint;
pub mod store;

pub use checkpoint::{Checkpoint, Checkpointer, MemorySaver};
pub use store::{FactStore, InMemoryStore, Namespace};

use crate::types::{MemoryFact, Result};

/// Namespace root used for long-term facts when none is configured.
pub const DEFAULT_NAMESPACE: &str = "ltm-multi";

/// User id used when the caller doesn't supply one.
pub const DEFAULT_USER_ID: &str = "default";

/// Per-invocation configuration handed to every graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Conversation thread (session) the turn belongs to
    pub thread_id: String,
    /// Owner of the long-term facts
    pub user_id: String,
    /// Root segment of the fact namespace
    pub namespace: String,
}

impl RunConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            user_id: DEFAULT_USER_ID.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Namespace holding this user's facts: `<namespace>/<user_id>`.
    pub fn fact_namespace(&self) -> Result<Namespace> {
        Namespace::new([self.namespace.as_str(), self.user_id.as_str()])
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Rebuild the newline-joined fact log used as `memory_context`.
///
/// Each fact is prefixed by a newline, matching how the long-term responder
/// grows the log turn by turn.
pub fn render_memory_context(facts: &[MemoryFact]) -> String {
    facts
        .iter()
        .map(|fact| format!("\n{}", fact.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fact(content: &str) -> MemoryFact {
        MemoryFact {
            id: content.to_string(),
            namespace: vec![DEFAULT_NAMESPACE.to_string()],
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_memory_context(&[]), "");
    }

    #[test]
    fn test_render_matches_incremental_log() {
        let facts = vec![fact("remember my cat is Tom"), fact("remember I like tea")];
        assert_eq!(
            render_memory_context(&facts),
            "\nremember my cat is Tom\nremember I like tea"
        );
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new("session-1");
        assert_eq!(config.thread_id, "session-1");
        assert_eq!(config.user_id, "default");
        assert_eq!(config.fact_namespace().unwrap().to_string(), "ltm-multi/default");
    }

    #[test]
    fn test_run_config_builders() {
        let config = RunConfig::new("s").with_user("alice").with_namespace("facts");
        assert_eq!(config.fact_namespace().unwrap().to_string(), "facts/alice");
    }

    #[test]
    fn test_default_run_config_has_unique_thread() {
        assert_ne!(RunConfig::default().thread_id, RunConfig::default().thread_id);
    }
}
