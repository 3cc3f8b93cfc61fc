//! Sliding context window over the conversation history
//!
//! The history never holds more than `max_turns` messages. Appending past
//! capacity drops the oldest turns first. The system directive lives outside
//! the history and is only prepended when a request is built.

use crate::llm::{Message, Role};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Default number of turns kept in the history
pub const DEFAULT_MAX_TURNS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("max_turns must be at least 1")]
    ZeroCapacity,
}

/// Capacity and system directive for a conversation's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    max_turns: NonZeroUsize,
    system_directive: Message,
}

impl ContextWindow {
    pub fn new(max_turns: usize, system_directive: impl Into<String>) -> Result<Self, WindowError> {
        let max_turns = NonZeroUsize::new(max_turns).ok_or(WindowError::ZeroCapacity)?;
        Ok(Self {
            max_turns,
            system_directive: Message::system(system_directive),
        })
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns.get()
    }

    /// Return `history` with `message` appended, keeping only the newest
    /// `max_turns` entries.
    pub fn append(&self, history: &[Message], message: Message) -> Vec<Message> {
        debug_assert_ne!(message.role, Role::System, "system turns never enter the history");

        let keep_from = (history.len() + 1).saturating_sub(self.max_turns());
        let mut next = Vec::with_capacity(history.len() + 1 - keep_from);
        next.extend(history.iter().skip(keep_from).cloned());
        next.push(message);
        next
    }

    /// Build the outbound sequence: system directive followed by the history.
    pub fn to_request(&self, history: &[Message]) -> Vec<Message> {
        std::iter::once(self.system_directive.clone())
            .chain(history.iter().cloned())
            .collect()
    }
}
