//! Effects produced by state transitions

use super::state::Generation;
use crate::llm::Message;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish the current history and in-flight flag to the renderer
    PublishSnapshot,

    /// Make an LLM request with the already-built request sequence
    RequestLlm {
        generation: Generation,
        messages: Vec<Message>,
    },
}
