//! Conversation state types

use super::window::ContextWindow;
use crate::llm::Message;
use std::fmt;

/// Tag distinguishing successive requests.
///
/// Bumped on every submission and every reset; a reply is only applied if it
/// carries the generation the conversation is still awaiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a request is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready for user input, no pending request
    #[default]
    Idle,

    /// Exactly one request in flight
    Awaiting { generation: Generation },
}

/// Conversation state, owned exclusively by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvState {
    pub phase: Phase,
    pub history: Vec<Message>,
    /// Most recently issued generation
    pub generation: Generation,
    /// Turns ever added to the history, including evicted and cleared ones
    pub turns_added: u64,
}

impl ConvState {
    /// Fresh conversation seeded with an assistant greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            phase: Phase::Idle,
            history: vec![Message::assistant(greeting)],
            generation: Generation::default(),
            turns_added: 1,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::Awaiting { .. })
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub window: ContextWindow,
    /// Greeting that replaces the history on reset
    pub reset_greeting: String,
}

impl ConvContext {
    pub fn new(window: ContextWindow, reset_greeting: impl Into<String>) -> Self {
        Self {
            window,
            reset_greeting: reset_greeting.into(),
        }
    }
}
