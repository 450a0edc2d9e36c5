//! Long-term memory: namespaced, append-only fact logs.

use crate::types::{AppError, MemoryFact, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Hierarchical key under which facts are stored, e.g. `ltm-multi/alice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(AppError::InvalidInput(
                "Namespace needs at least one segment".to_string(),
            ));
        }
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || s.contains('/')) {
            return Err(AppError::InvalidInput(format!(
                "Invalid namespace segment '{}'",
                bad
            )));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Storage for long-term facts.
///
/// Facts are only ever appended; the sole way to remove them is clearing a
/// whole namespace.
pub trait FactStore: Send + Sync {
    fn append(&self, namespace: &Namespace, fact: &str) -> Result<MemoryFact>;

    /// Facts in `namespace`, in insertion order.
    fn list(&self, namespace: &Namespace) -> Result<Vec<MemoryFact>>;

    /// Remove all facts in `namespace`; returns how many were removed.
    fn clear(&self, namespace: &Namespace) -> Result<usize>;

    /// Namespaces holding at least one fact, sorted.
    fn namespaces(&self) -> Result<Vec<Namespace>>;
}

/// In-process fact store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    facts: RwLock<HashMap<Namespace, Vec<MemoryFact>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactStore for InMemoryStore {
    fn append(&self, namespace: &Namespace, fact: &str) -> Result<MemoryFact> {
        let fact = MemoryFact {
            id: Uuid::new_v4().to_string(),
            namespace: namespace.segments().to_vec(),
            content: fact.to_string(),
            created_at: Utc::now(),
        };

        self.facts
            .write()
            .entry(namespace.clone())
            .or_default()
            .push(fact.clone());

        tracing::debug!(namespace = %namespace, fact_id = %fact.id, "Fact appended");
        Ok(fact)
    }

    fn list(&self, namespace: &Namespace) -> Result<Vec<MemoryFact>> {
        Ok(self
            .facts
            .read()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn clear(&self, namespace: &Namespace) -> Result<usize> {
        Ok(self
            .facts
            .write()
            .remove(namespace)
            .map(|facts| facts.len())
            .unwrap_or(0))
    }

    fn namespaces(&self) -> Result<Vec<Namespace>> {
        let mut namespaces: Vec<Namespace> = self.facts.read().keys().cloned().collect();
        namespaces.sort();
        Ok(namespaces)
    }
}
