pub mod controller;
pub mod ltm;
pub mod stm;

use crate::types::ConversationState;

// Re-export commonly used types
pub use controller::{decide_route, Controller};
pub use ltm::LtmAgent;
pub use stm::StmAgent;

/// Node name of the keyword controller
pub const CONTROLLER: &str = "controller";
/// Node name of the short-term memory responder
pub const STM: &str = "stm";
/// Node name of the long-term memory responder
pub const LTM: &str = "ltm";

/// Conditional-edge selector: the label the controller stored in `route`.
///
/// Yields an empty label when no route was set, which the graph rejects as
/// unmapped.
pub fn select_route(state: &ConversationState) -> String {
    state
        .route
        .map(|route| route.as_str().to_string())
        .unwrap_or_default()
}
