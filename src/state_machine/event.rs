//! Events that can occur in a conversation

use super::state::Generation;
use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },
    Reset,

    // LLM events, tagged with the generation of the request they answer
    LlmReply {
        generation: Generation,
        reply: String,
    },
    LlmError {
        generation: Generation,
        message: String,
        error_kind: LlmErrorKind,
    },
}
