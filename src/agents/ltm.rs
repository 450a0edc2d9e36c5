//! Long-term memory responder.
//!
//! Answers with the accumulated fact log as context. Messages that ask to be
//! remembered are appended to the log and handed back as
//! `pending_fact`; the conversation runtime writes it to the fact store once
//! the turn is checkpointed.

use crate::{
    graph::Node,
    llm::LLMClient,
    memory::RunConfig,
    types::{ConversationState, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Keyword that makes a message part of long-term memory
pub const REMEMBER_KEYWORD: &str = "remember";

/// Render the prompt for a turn from the incoming state.
pub fn build_prompt(state: &ConversationState) -> String {
    format!(
        "You are the LTM Agent.\n\
         Stored facts: {}\n\
         Current user message: {}\n\
         Respond concisely.",
        state.memory_context, state.user_message
    )
}

/// Whether `message` should be stored as a fact. Case-insensitive.
pub fn should_remember(message: &str) -> bool {
    message.to_lowercase().contains(REMEMBER_KEYWORD)
}

pub struct LtmAgent {
    llm: Arc<dyn LLMClient>,
}

impl LtmAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ConversationState> for LtmAgent {
    fn name(&self) -> &str {
        super::LTM
    }

    async fn run(&self, state: ConversationState, config: &RunConfig) -> Result<ConversationState> {
        // Rendered before the log grows: a fact stored this turn shows up from the next turn on.
        let prompt = build_prompt(&state);
        let response = self.llm.generate(&prompt).await?;

        let mut memory_context = state.memory_context.clone();
        let mut pending_fact = None;
        if should_remember(&state.user_message) {
            memory_context.push('\n');
            memory_context.push_str(&state.user_message);
            pending_fact = Some(state.user_message.clone());
        }

        tracing::debug!(
            thread_id = %config.thread_id,
            model = self.llm.model_name(),
            "LTM responder answered"
        );

        Ok(ConversationState {
            memory_context,
            response,
            pending_fact,
            ..state
        })
    }
}
