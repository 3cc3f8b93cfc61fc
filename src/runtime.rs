//! Runtime for executing a conversation
//!
//! A single task owns the conversation state and applies events one at a
//! time. LLM requests run as background tasks and report back through the
//! same event channel, tagged with the generation they were issued for.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;

use crate::llm::LlmService;
use crate::state_machine::{ConvContext, ConvState, Event};
use crate::view::Snapshot;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Error)]
#[error("Conversation runtime has stopped")]
pub struct RuntimeStopped;

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl ConversationHandle {
    fn new(event_tx: mpsc::Sender<Event>, snapshot_rx: watch::Receiver<Snapshot>) -> Self {
        Self {
            event_tx,
            snapshot_rx,
        }
    }

    /// Submit user text. Blank text, or text sent while a reply is pending,
    /// is ignored by the conversation.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.send(Event::UserMessage { text: text.into() }).await
    }

    /// Start over with a fresh greeting; a pending reply will be discarded
    pub async fn reset(&self) -> Result<(), RuntimeStopped> {
        self.send(Event::Reset).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, event: Event) -> Result<(), RuntimeStopped> {
        self.event_tx.send(event).await.map_err(|_| RuntimeStopped)
    }
}

/// Start a conversation runtime on the current tokio runtime
pub fn spawn<L>(
    context: ConvContext,
    state: ConvState,
    llm: Arc<L>,
) -> (ConversationHandle, JoinHandle<()>)
where
    L: LlmService + ?Sized + 'static,
{
    let (runtime, handle) = ConversationRuntime::new(context, state, llm);
    let task = tokio::spawn(runtime.run());
    (handle, task)
}
