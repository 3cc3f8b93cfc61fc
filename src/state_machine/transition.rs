//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result, with no I/O. The runtime executes the returned effects.

use super::{ConvContext, ConvState, Effect, Event, Generation, Phase};
use crate::llm::Message;
use thiserror::Error;

/// Prefix of the assistant turn that replaces a failed request
pub const ERROR_PREFIX: &str = "Error: ";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the current state does not accept.
///
/// None of these are user-visible; the runtime drops the event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Reply for generation {0} still pending, message ignored")]
    AgentBusy(Generation),
    #[error("Discarding reply for generation {received} (current generation {current})")]
    StaleReply {
        received: Generation,
        current: Generation,
    },
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // User Message Handling
        // ============================================================
        (_, Event::UserMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + UserMessage -> Awaiting
        (Phase::Idle, Event::UserMessage { text }) => {
            let generation = state.generation.next();
            let history = context
                .window
                .append(&state.history, Message::user(text.trim()));
            // Built from the history committed by this transition, never a
            // copy taken before an earlier await
            let messages = context.window.to_request(&history);

            Ok(TransitionResult::new(ConvState {
                phase: Phase::Awaiting { generation },
                history,
                generation,
                turns_added: state.turns_added + 1,
            })
            .with_effect(Effect::PublishSnapshot)
            .with_effect(Effect::RequestLlm {
                generation,
                messages,
            }))
        }

        (Phase::Awaiting { generation }, Event::UserMessage { .. }) => {
            Err(TransitionError::AgentBusy(generation))
        }

        // ============================================================
        // Reset
        // ============================================================

        // Any + Reset -> Idle with a new generation, so a pending reply is stale
        (_, Event::Reset) => Ok(TransitionResult::new(ConvState {
            phase: Phase::Idle,
            history: vec![Message::assistant(context.reset_greeting.as_str())],
            generation: state.generation.next(),
            turns_added: state.turns_added + 1,
        })
        .with_effect(Effect::PublishSnapshot)),

        // ============================================================
        // LLM Response Processing
        // ============================================================
        (Phase::Awaiting { generation }, Event::LlmReply { generation: g, reply })
            if g == generation =>
        {
            Ok(settle(state, context, Message::assistant(reply)))
        }

        // Failures become a visible assistant turn
        (Phase::Awaiting { generation }, Event::LlmError { generation: g, message, .. })
            if g == generation =>
        {
            Ok(settle(state, context, error_message(&message)))
        }

        (
            _,
            Event::LlmReply {
                generation: received,
                ..
            }
            | Event::LlmError {
                generation: received,
                ..
            },
        ) => Err(TransitionError::StaleReply {
            received,
            current: state.generation,
        }),
    }
}

/// Assistant turn shown in place of a reply when the request failed
pub fn error_message(description: &str) -> Message {
    Message::assistant(format!("{ERROR_PREFIX}{description}"))
}

/// Append the resolution of the outstanding request and return to Idle
fn settle(state: &ConvState, context: &ConvContext, message: Message) -> TransitionResult {
    TransitionResult::new(ConvState {
        phase: Phase::Idle,
        history: context.window.append(&state.history, message),
        generation: state.generation,
        turns_added: state.turns_added + 1,
    })
    .with_effect(Effect::PublishSnapshot)
}
