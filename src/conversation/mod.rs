//! Conversation runtime
//!
//! Wires the controller and both memory responders into a graph and wraps it
//! with the two memory backends:
//!
//! ```text
//! controller ──stm──▶ stm ──▶ END
//!      └─────ltm──▶ ltm ──▶ END
//! ```
//!
//! Each [`ConversationApp::invoke`] resumes the thread's latest checkpoint,
//! runs exactly one turn and checkpoints the result. A fact the long-term
//! responder recorded is written to the fact store only after the checkpoint
//! succeeded.

use crate::agents::{self, Controller, LtmAgent, StmAgent};
use crate::graph::{CompiledGraph, GraphStep, StateGraph, DEFAULT_RECURSION_LIMIT, END};
use crate::llm::LLMClient;
use crate::memory::{
    render_memory_context, Checkpoint, Checkpointer, FactStore, InMemoryStore, MemorySaver,
    RunConfig, DEFAULT_NAMESPACE, DEFAULT_USER_ID,
};
use crate::types::{AppError, ConversationState, MemoryFact, Result, Route};
use std::sync::Arc;

/// Smallest recursion limit that fits a turn: the controller plus one responder.
pub const MIN_RECURSION_LIMIT: usize = 2;

/// Build the three-node conversation graph (not yet compiled).
pub fn build_graph(llm: Arc<dyn LLMClient>) -> StateGraph<ConversationState> {
    let mut graph = StateGraph::new();
    graph
        .add_node(Controller::new())
        .add_node(StmAgent::new(Arc::clone(&llm)))
        .add_node(LtmAgent::new(llm))
        .set_entry_point(agents::CONTROLLER)
        .add_conditional_edges(
            agents::CONTROLLER,
            agents::select_route,
            &[(agents::STM, agents::STM), (agents::LTM, agents::LTM)],
        )
        .add_edge(agents::STM, END)
        .add_edge(agents::LTM, END);
    graph
}

/// Result of one conversation turn
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// The model's reply
    pub response: String,
    /// Branch the controller picked
    pub route: Route,
    /// Full state after the turn (as checkpointed)
    pub state: ConversationState,
    /// Nodes executed during the turn
    pub steps: Vec<GraphStep>,
    /// Id of the checkpoint written for this turn
    pub checkpoint_id: String,
}

/// Builder for [`ConversationApp`]
pub struct ConversationAppBuilder {
    llm: Arc<dyn LLMClient>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    store: Option<Arc<dyn FactStore>>,
    user_id: String,
    namespace: String,
    recursion_limit: usize,
}

impl ConversationAppBuilder {
    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn store(mut self, store: Arc<dyn FactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Compile the graph. Backends not supplied default to in-memory ones.
    pub fn build(self) -> Result<ConversationApp> {
        if self.recursion_limit < MIN_RECURSION_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "recursion limit must be at least {}, got {}",
                MIN_RECURSION_LIMIT, self.recursion_limit
            )));
        }

        let checkpointer = self
            .checkpointer
            .unwrap_or_else(|| Arc::new(MemorySaver::new()));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        let mut graph = build_graph(self.llm);
        graph.set_recursion_limit(self.recursion_limit);

        let app = ConversationApp {
            graph: graph.compile()?,
            checkpointer,
            store,
            user_id: self.user_id,
            namespace: self.namespace,
        };
        // Reject bad user ids / namespaces up front rather than on the first remembered fact
        app.run_config("validation").fact_namespace()?;

        Ok(app)
    }
}

/// A compiled conversation graph plus the memory it reads and writes
pub struct ConversationApp {
    graph: CompiledGraph<ConversationState>,
    checkpointer: Arc<dyn Checkpointer>,
    store: Arc<dyn FactStore>,
    user_id: String,
    namespace: String,
}

impl ConversationApp {
    pub fn builder(llm: Arc<dyn LLMClient>) -> ConversationAppBuilder {
        ConversationAppBuilder {
            llm,
            checkpointer: None,
            store: None,
            user_id: DEFAULT_USER_ID.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// App with non-durable in-process backends
    pub fn in_memory(llm: Arc<dyn LLMClient>) -> Result<Self> {
        Self::builder(llm).build()
    }

    pub fn run_config(&self, thread_id: &str) -> RunConfig {
        RunConfig::new(thread_id)
            .with_user(self.user_id.clone())
            .with_namespace(self.namespace.clone())
    }

    /// Run one turn of `thread_id` and checkpoint the resulting state.
    pub async fn invoke(&self, thread_id: &str, user_message: &str) -> Result<TurnOutput> {
        let config = self.run_config(thread_id);
        let state = ConversationState {
            route: None,
            response: String::new(),
            ..self.resume(&config)?
        }
        .with_user_message(user_message);

        let output = self.graph.invoke_with_trace(state, &config).await?;
        let mut state = output.state;
        let route = state.route.ok_or_else(|| {
            AppError::Internal("Turn finished without a route being set".to_string())
        })?;

        let pending_fact = state.pending_fact.take();
        let checkpoint = self.checkpointer.put(thread_id, &state)?;

        if let Some(fact) = pending_fact {
            let namespace = config.fact_namespace()?;
            self.store.append(&namespace, &fact)?;
            tracing::info!(thread_id, %namespace, "Stored long-term fact");
        }

        tracing::info!(
            thread_id,
            %route,
            step = checkpoint.step,
            "Conversation turn completed"
        );

        Ok(TurnOutput {
            response: state.response.clone(),
            route,
            state,
            steps: output.steps,
            checkpoint_id: checkpoint.id,
        })
    }

    /// Run the graph on a caller-supplied state.
    ///
    /// Neither checkpoints nor the fact store are touched; a remembered
    /// message is only reported through `pending_fact` and `memory_context`.
    pub async fn invoke_state(
        &self,
        state: ConversationState,
        config: &RunConfig,
    ) -> Result<ConversationState> {
        self.graph.invoke(state, config).await
    }

    /// Latest state of a thread, or a fresh state whose long-term log is
    /// seeded from the fact store.
    fn resume(&self, config: &RunConfig) -> Result<ConversationState> {
        if let Some(checkpoint) = self.checkpointer.get(&config.thread_id)? {
            return Ok(checkpoint.state);
        }

        let facts = self.store.list(&config.fact_namespace()?)?;
        tracing::debug!(
            thread_id = %config.thread_id,
            facts = facts.len(),
            "Starting new thread"
        );

        Ok(ConversationState::default().with_memory_context(render_memory_context(&facts)))
    }

    /// Latest checkpointed state of a thread
    pub fn state(&self, thread_id: &str) -> Result<Option<ConversationState>> {
        Ok(self
            .checkpointer
            .get(thread_id)?
            .map(|checkpoint| checkpoint.state))
    }

    /// Every checkpoint of a thread, oldest first
    pub fn history(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        self.checkpointer.list(thread_id)
    }

    /// Forget a thread's short-term state. Long-term facts are kept.
    pub fn reset_thread(&self, thread_id: &str) -> Result<usize> {
        let removed = self.checkpointer.delete_thread(thread_id)?;
        tracing::info!(thread_id, removed, "Thread reset");
        Ok(removed)
    }

    /// Long-term facts of the configured user
    pub fn facts(&self) -> Result<Vec<MemoryFact>> {
        self.store.list(&self.run_config("").fact_namespace()?)
    }

    /// Clear the configured user's fact namespace.
    ///
    /// Threads that already copied the log into their state keep it until
    /// [`reset_thread`](Self::reset_thread).
    pub fn forget_facts(&self) -> Result<usize> {
        let namespace = self.run_config("").fact_namespace()?;
        let removed = self.store.clear(&namespace)?;
        tracing::info!(%namespace, removed, "Long-term facts cleared");
        Ok(removed)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Node names of the compiled graph, entry point first
    pub fn node_names(&self) -> &[String] {
        self.graph.node_names()
    }
}
