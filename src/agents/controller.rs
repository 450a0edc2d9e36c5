use crate::{
    graph::Node,
    memory::RunConfig,
    types::{ConversationState, Result, Route},
};
use async_trait::async_trait;

/// Keywords that send a turn to the long-term memory responder
pub const LTM_KEYWORDS: &[&str] = &["remember", "recall"];

/// Choose the branch for a message.
///
/// Matching is a case-insensitive substring test, so "Recalling" and
/// "REMEMBERED" both route to long-term memory.
pub fn decide_route(message: &str) -> Route {
    let lowered = message.to_lowercase();

    if LTM_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        Route::Ltm
    } else {
        Route::Stm
    }
}

/// Entry node of the conversation graph.
///
/// Sets `route` and touches nothing else. No LLM call is involved, so the
/// decision is deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct Controller;

impl Controller {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Node<ConversationState> for Controller {
    fn name(&self) -> &str {
        super::CONTROLLER
    }

    async fn run(&self, state: ConversationState, config: &RunConfig) -> Result<ConversationState> {
        let route = decide_route(&state.user_message);
        tracing::debug!(thread_id = %config.thread_id, %route, "Controller routed message");

        Ok(ConversationState {
            route: Some(route),
            ..state
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_route_to_ltm() {
        assert_eq!(decide_route("please remember my birthday is May 5"), Route::Ltm);
        assert_eq!(decide_route("Can you RECALL what I said?"), Route::Ltm);
    }

    #[test]
    fn test_other_messages_route_to_stm() {
        assert_eq!(decide_route("what's the weather"), Route::Stm);
        assert_eq!(decide_route(""), Route::Stm);
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(decide_route("I remembered something"), Route::Ltm);
        assert_eq!(decide_route("product recalls"), Route::Ltm);
    }

    #[tokio::test]
    async fn test_controller_only_sets_route() {
        let state = ConversationState::new("recall my cat's name")
            .with_last_message("hi")
            .with_memory_context("\nremember my cat is Tom");

        let out = Controller::new()
            .run(state.clone(), &RunConfig::new("t"))
            .await
            .unwrap();

        assert_eq!(out.route, Some(Route::Ltm));
        assert_eq!(
            ConversationState { route: None, ..out },
            state,
            "controller must not touch other fields"
        );
    }

    #[tokio::test]
    async fn test_controller_is_idempotent() {
        let controller = Controller::new();
        let config = RunConfig::new("t");
        let state = ConversationState::new("what's the weather");

        let once = controller.run(state, &config).await.unwrap();
        let twice = controller.run(once.clone(), &config).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.route, Some(Route::Stm));
    }
}
