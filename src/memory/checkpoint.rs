//! Short-term memory: per-thread checkpoints of the conversation state.

use crate::types::{ConversationState, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Snapshot of the conversation state at the end of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub thread_id: String,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
    /// Turn number within the thread, starting at 1
    pub step: u64,
}

/// Storage for per-thread conversation checkpoints.
pub trait Checkpointer: Send + Sync {
    /// Store `state` as the newest checkpoint of `thread_id`.
    fn put(&self, thread_id: &str, state: &ConversationState) -> Result<Checkpoint>;

    /// Latest checkpoint of `thread_id`, if any turn has completed.
    fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    /// All checkpoints of `thread_id`, oldest first.
    fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>>;

    /// Drop every checkpoint of `thread_id`; returns how many were removed.
    fn delete_thread(&self, thread_id: &str) -> Result<usize>;
}

/// In-process checkpointer. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemorySaver {
    threads: RwLock<HashMap<String, Vec<Checkpoint>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with at least one checkpoint.
    pub fn thread_count(&self) -> usize {
        self.threads.read().len()
    }
}

impl Checkpointer for MemorySaver {
    fn put(&self, thread_id: &str, state: &ConversationState) -> Result<Checkpoint> {
        let mut threads = self.threads.write();
        let history = threads.entry(thread_id.to_string()).or_default();

        let checkpoint = Checkpoint {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            state: state.clone(),
            created_at: Utc::now(),
            step: history.len() as u64 + 1,
        };
        history.push(checkpoint.clone());

        tracing::trace!(thread_id, step = checkpoint.step, "Checkpoint stored");
        Ok(checkpoint)
    }

    fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self
            .threads
            .read()
            .get(thread_id)
            .and_then(|history| history.last().cloned()))
    }

    fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        Ok(self
            .threads
            .read()
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_thread(&self, thread_id: &str) -> Result<usize> {
        Ok(self
            .threads
            .write()
            .remove(thread_id)
            .map(|history| history.len())
            .unwrap_or(0))
    }
}
