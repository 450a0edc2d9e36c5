//! State Graph Module
//!
//! A minimal directed-graph executor: every node receives the state by value
//! and returns the updated state, and edges (plain or conditional) decide
//! which node runs next until [`END`] is reached.
//!
//! # Usage
//!
//! ```ignore
//! let mut graph = StateGraph::new();
//! graph
//!     .add_node(Controller::new())
//!     .add_node(StmAgent::new(llm.clone()))
//!     .add_node(LtmAgent::new(llm, store))
//!     .set_entry_point("controller")
//!     .add_conditional_edges("controller", select_route, &[("stm", "stm"), ("ltm", "ltm")])
//!     .add_edge("stm", END)
//!     .add_edge("ltm", END);
//!
//! let compiled = graph.compile()?;
//! let state = compiled.invoke(ConversationState::new("hi"), &RunConfig::new("s1")).await?;
//! ```

pub mod engine;

pub use engine::{
    CompiledGraph, GraphError, GraphOutput, GraphStep, Node, StateGraph, DEFAULT_RECURSION_LIMIT,
    END,
};
