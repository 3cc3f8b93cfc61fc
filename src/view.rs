//! Read-only projection of a conversation for the renderer

use crate::llm::{Message, Role};
use crate::state_machine::ConvState;

/// What the runtime publishes after each state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub history: Vec<Message>,
    pub in_flight: bool,
    /// Running count of appended turns, for spotting what is new
    pub turns_added: u64,
}

impl Snapshot {
    pub fn of(state: &ConvState) -> Self {
        Self {
            history: state.history.clone(),
            in_flight: state.is_in_flight(),
            turns_added: state.turns_added,
        }
    }
}

/// Everything the renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub turns: Vec<Message>,
    pub can_submit: bool,
}

impl ViewModel {
    pub fn project(snapshot: &Snapshot, pending_input: &str) -> Self {
        Self {
            turns: snapshot.history.clone(),
            can_submit: !pending_input.trim().is_empty() && !snapshot.in_flight,
        }
    }
}

/// Label shown above a turn
pub fn speaker_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    }
}

/// Caption for the submit control
pub fn submit_label(in_flight: bool) -> &'static str {
    if in_flight {
        "Sending..."
    } else {
        "Send"
    }
}
