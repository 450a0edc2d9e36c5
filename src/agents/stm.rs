//! Short-term memory responder.
//!
//! Answers with only the previous message as context, then remembers the
//! current message in its place.

use crate::{
    graph::Node,
    llm::LLMClient,
    memory::RunConfig,
    types::{ConversationState, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Render the prompt for a turn from the incoming state.
pub fn build_prompt(state: &ConversationState) -> String {
    format!(
        "You are the STM Agent.\n\
         The last message was: {}\n\
         Current user message: {}\n\
         Respond concisely.",
        state.last_message, state.user_message
    )
}

pub struct StmAgent {
    llm: Arc<dyn LLMClient>,
}

impl StmAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ConversationState> for StmAgent {
    fn name(&self) -> &str {
        super::STM
    }

    async fn run(&self, state: ConversationState, config: &RunConfig) -> Result<ConversationState> {
        // Rendered before last_message is replaced: the model sees the previous turn.
        let prompt = build_prompt(&state);
        let response = self.llm.generate(&prompt).await?;

        tracing::debug!(
            thread_id = %config.thread_id,
            model = self.llm.model_name(),
            "STM responder answered"
        );

        Ok(ConversationState {
            last_message: state.user_message.clone(),
            response,
            ..state
        })
    }
}
