//! State Graph Engine
//!
//! Executes a compiled graph of nodes by passing one state value from node to
//! node until the `END` marker is reached.

use crate::memory::RunConfig;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Terminal marker for edges.
pub const END: &str = "__end__";

/// Maximum number of node executions per invocation unless overridden.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// A single step of a graph: receives the state and returns the updated state.
#[async_trait]
pub trait Node<S: Send + 'static>: Send + Sync {
    /// Unique name of the node inside its graph
    fn name(&self) -> &str;

    /// Execute the node
    async fn run(&self, state: S, config: &RunConfig) -> Result<S>;
}

type Selector<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

enum Edge<S> {
    Direct(String),
    Conditional {
        selector: Selector<S>,
        mapping: HashMap<String, String>,
    },
}

/// Errors detected while compiling a [`StateGraph`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Graph has no entry point")]
    MissingEntryPoint,

    #[error("Node '{0}' is registered more than once")]
    DuplicateNode(String),

    #[error("Node name '{0}' is reserved")]
    ReservedName(String),

    #[error("Edge references unknown node '{0}'")]
    UnknownNode(String),

    #[error("Node '{0}' has no outgoing edge")]
    MissingEdge(String),

    #[error("Node '{0}' has more than one outgoing edge")]
    DuplicateEdge(String),

    #[error("Conditional edge from '{0}' has an empty mapping")]
    EmptyMapping(String),

    #[error("Recursion limit must be at least 1")]
    InvalidRecursionLimit,
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        AppError::Graph(err.to_string())
    }
}

/// Record of one executed node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStep {
    /// The node that executed this step
    pub node: String,
    /// Unix timestamp when this step started
    pub timestamp: i64,
    /// Duration of this step in milliseconds
    pub duration_ms: u64,
}

/// Final state plus the path taken through the graph
#[derive(Debug, Clone)]
pub struct GraphOutput<S> {
    pub state: S,
    pub steps: Vec<GraphStep>,
}

/// Builder for a directed graph of [`Node`]s sharing one state type.
pub struct StateGraph<S: Send + 'static> {
    nodes: Vec<Arc<dyn Node<S>>>,
    edges: Vec<(String, Edge<S>)>,
    entry_point: Option<String>,
    recursion_limit: usize,
}

impl<S: Send + 'static> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + 'static> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            entry_point: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn add_node<N>(&mut self, node: N) -> &mut Self
    where
        N: Node<S> + 'static,
    {
        self.nodes.push(Arc::new(node));
        self
    }

    /// Unconditional edge; `to` may be [`END`].
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        self.edges
            .push((from.to_string(), Edge::Direct(to.to_string())));
        self
    }

    /// Edge chosen at run time: `selector` returns a label which is looked up
    /// in `mapping` to find the next node.
    pub fn add_conditional_edges<F>(
        &mut self,
        from: &str,
        selector: F,
        mapping: &[(&str, &str)],
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        let mapping = mapping
            .iter()
            .map(|(label, target)| (label.to_string(), target.to_string()))
            .collect();

        self.edges.push((
            from.to_string(),
            Edge::Conditional {
                selector: Arc::new(selector),
                mapping,
            },
        ));
        self
    }

    pub fn set_entry_point(&mut self, name: &str) -> &mut Self {
        self.entry_point = Some(name.to_string());
        self
    }

    pub fn set_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Validate the graph and freeze it for execution
    pub fn compile(self) -> std::result::Result<CompiledGraph<S>, GraphError> {
        if self.recursion_limit == 0 {
            return Err(GraphError::InvalidRecursionLimit);
        }

        let mut nodes: HashMap<String, Arc<dyn Node<S>>> = HashMap::new();
        let mut order = Vec::new();
        for node in self.nodes {
            let name = node.name().to_string();
            if name == END {
                return Err(GraphError::ReservedName(name));
            }
            if nodes.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            order.push(name.clone());
            nodes.insert(name, node);
        }

        let entry_point = self.entry_point.ok_or(GraphError::MissingEntryPoint)?;
        if !nodes.contains_key(&entry_point) {
            return Err(GraphError::UnknownNode(entry_point));
        }

        let is_target = |name: &str| name == END || nodes.contains_key(name);

        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        for (from, edge) in self.edges {
            if !nodes.contains_key(&from) {
                return Err(GraphError::UnknownNode(from));
            }
            match &edge {
                Edge::Direct(to) => {
                    if !is_target(to.as_str()) {
                        return Err(GraphError::UnknownNode(to.clone()));
                    }
                }
                Edge::Conditional { mapping, .. } => {
                    if mapping.is_empty() {
                        return Err(GraphError::EmptyMapping(from));
                    }
                    if let Some(target) = mapping.values().find(|t| !is_target(t.as_str())) {
                        return Err(GraphError::UnknownNode(target.clone()));
                    }
                }
            }
            if edges.contains_key(&from) {
                return Err(GraphError::DuplicateEdge(from));
            }
            edges.insert(from, edge);
        }

        if let Some(stranded) = order.iter().find(|name| !edges.contains_key(*name)) {
            return Err(GraphError::MissingEdge(stranded.clone()));
        }

        Ok(CompiledGraph {
            nodes,
            edges,
            order,
            entry_point,
            recursion_limit: self.recursion_limit,
        })
    }
}

/// Validated, immutable graph ready to run
pub struct CompiledGraph<S: Send + 'static> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    order: Vec<String>,
    entry_point: String,
    recursion_limit: usize,
}

impl<S: Send + 'static> CompiledGraph<S> {
    /// Run the graph from the entry point and return the final state
    pub async fn invoke(&self, state: S, config: &RunConfig) -> Result<S> {
        Ok(self.invoke_with_trace(state, config).await?.state)
    }

    /// Run the graph and also report every executed node
    pub async fn invoke_with_trace(&self, state: S, config: &RunConfig) -> Result<GraphOutput<S>> {
        let mut state = state;
        let mut steps = Vec::new();
        let mut current = self.entry_point.clone();

        while current != END {
            if steps.len() >= self.recursion_limit {
                return Err(AppError::Graph(format!(
                    "Recursion limit of {} reached without hitting END (last node '{}')",
                    self.recursion_limit, current
                )));
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| AppError::Graph(format!("Unknown node '{}'", current)))?;

            let step_start = std::time::Instant::now();
            let timestamp = Utc::now().timestamp();

            state = node.run(state, config).await?;

            let duration_ms = step_start.elapsed().as_millis() as u64;
            tracing::debug!(
                node = %current,
                thread_id = %config.thread_id,
                duration_ms,
                "Graph node finished"
            );
            steps.push(GraphStep {
                node: current.clone(),
                timestamp,
                duration_ms,
            });

            current = self.next_node(&current, &state)?;
        }

        Ok(GraphOutput { state, steps })
    }

    fn next_node(&self, from: &str, state: &S) -> Result<String> {
        match self.edges.get(from) {
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { selector, mapping }) => {
                let label = (selector.as_ref())(state);
                mapping.get(&label).cloned().ok_or_else(|| {
                    AppError::Graph(format!(
                        "Conditional edge from '{}' produced unmapped label '{}'",
                        from, label
                    ))
                })
            }
            None => Err(AppError::Graph(format!("Node '{}' has no outgoing edge", from))),
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Node names in registration order
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends its own name to a Vec<String> state
    struct Push(&'static str);

    #[async_trait]
    impl Node<Vec<String>> for Push {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, mut state: Vec<String>, _config: &RunConfig) -> Result<Vec<String>> {
            state.push(self.0.to_string());
            Ok(state)
        }
    }

    struct Fail;

    #[async_trait]
    impl Node<Vec<String>> for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        async fn run(&self, _state: Vec<String>, _config: &RunConfig) -> Result<Vec<String>> {
            Err(AppError::LLM("boom".to_string()))
        }
    }

    fn branching_graph() -> CompiledGraph<Vec<String>> {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("start"))
            .add_node(Push("left"))
            .add_node(Push("right"))
            .set_entry_point("start")
            .add_conditional_edges(
                "start",
                |state: &Vec<String>| {
                    if state.iter().any(|s| s == "go-left") {
                        "l".to_string()
                    } else {
                        "r".to_string()
                    }
                },
                &[("l", "left"), ("r", "right")],
            )
            .add_edge("left", END)
            .add_edge("right", END);
        graph.compile().unwrap()
    }

    #[tokio::test]
    async fn test_conditional_routing() {
        let graph = branching_graph();
        let config = RunConfig::new("t");

        let left = graph
            .invoke(vec!["go-left".to_string()], &config)
            .await
            .unwrap();
        assert_eq!(left, vec!["go-left", "start", "left"]);

        let right = graph.invoke(vec![], &config).await.unwrap();
        assert_eq!(right, vec!["start", "right"]);
    }

    #[tokio::test]
    async fn test_trace_records_each_step() {
        let graph = branching_graph();
        let output = graph
            .invoke_with_trace(vec![], &RunConfig::new("t"))
            .await
            .unwrap();

        let nodes: Vec<&str> = output.steps.iter().map(|s| s.node.as_str()).collect();
        assert_eq!(nodes, vec!["start", "right"]);
    }

    #[tokio::test]
    async fn test_node_error_propagates() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Fail)
            .set_entry_point("fail")
            .add_edge("fail", END);
        let graph = graph.compile().unwrap();

        let err = graph.invoke(vec![], &RunConfig::new("t")).await.unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
    }

    #[tokio::test]
    async fn test_recursion_limit() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("loop"))
            .set_entry_point("loop")
            .add_edge("loop", "loop")
            .set_recursion_limit(3);
        let graph = graph.compile().unwrap();

        let err = graph.invoke(vec![], &RunConfig::new("t")).await.unwrap_err();
        assert!(err.to_string().contains("Recursion limit of 3"));
    }

    #[tokio::test]
    async fn test_unmapped_label_is_graph_error() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("start"))
            .set_entry_point("start")
            .add_conditional_edges("start", |_: &Vec<String>| "nowhere".to_string(), &[("x", END)]);
        let graph = graph.compile().unwrap();

        let err = graph.invoke(vec![], &RunConfig::new("t")).await.unwrap_err();
        assert!(matches!(err, AppError::Graph(_)));
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_compile_requires_entry_point() {
        let mut graph = StateGraph::new();
        graph.add_node(Push("a")).add_edge("a", END);
        assert_eq!(graph.compile().err(), Some(GraphError::MissingEntryPoint));
    }

    #[test]
    fn test_compile_rejects_duplicate_nodes() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("a"))
            .add_node(Push("a"))
            .set_entry_point("a")
            .add_edge("a", END);
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::DuplicateNode("a".to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_reserved_name() {
        let mut graph = StateGraph::new();
        graph.add_node(Push(END)).set_entry_point(END);
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::ReservedName(END.to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_unknown_target() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("a"))
            .set_entry_point("a")
            .add_edge("a", "ghost");
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::UnknownNode("ghost".to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_stranded_node() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("a"))
            .add_node(Push("b"))
            .set_entry_point("a")
            .add_edge("a", END);
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::MissingEdge("b".to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_second_edge_set() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("a"))
            .set_entry_point("a")
            .add_edge("a", END)
            .add_edge("a", END);
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::DuplicateEdge("a".to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_empty_mapping() {
        let mut graph = StateGraph::new();
        graph
            .add_node(Push("a"))
            .set_entry_point("a")
            .add_conditional_edges("a", |_: &Vec<String>| String::new(), &[]);
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::EmptyMapping("a".to_string()))
        );
    }

    #[test]
    fn test_compiled_introspection() {
        let graph = branching_graph();
        assert_eq!(graph.entry_point(), "start");
        assert_eq!(graph.node_names(), &["start", "left", "right"]);
        assert_eq!(graph.recursion_limit(), DEFAULT_RECURSION_LIMIT);
    }
}
