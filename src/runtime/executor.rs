//! Conversation runtime executor

use super::{ConversationHandle, EVENT_CHANNEL_CAPACITY};
use crate::llm::{LlmService, Message};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, Generation};
use crate::view::Snapshot;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Conversation runtime, generic over the completion backend
pub struct ConversationRuntime<L>
where
    L: LlmService + ?Sized + 'static,
{
    context: ConvContext,
    state: ConvState,
    llm: Arc<L>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once every handle and request task is gone
    event_tx: mpsc::WeakSender<Event>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl<L> ConversationRuntime<L>
where
    L: LlmService + ?Sized + 'static,
{
    pub fn new(context: ConvContext, state: ConvState, llm: Arc<L>) -> (Self, ConversationHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::of(&state));

        let runtime = Self {
            context,
            state,
            llm,
            event_rx,
            event_tx: event_tx.downgrade(),
            snapshot_tx,
        };
        (runtime, ConversationHandle::new(event_tx, snapshot_rx))
    }

    pub async fn run(mut self) {
        tracing::info!(
            endpoint = %self.llm.endpoint(),
            max_turns = self.context.window.max_turns(),
            "Starting conversation runtime"
        );

        // Process events in a loop, one at a time
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!("Conversation runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let failure = match &event {
            Event::LlmError {
                generation,
                error_kind,
                ..
            } => Some((*generation, *error_kind)),
            _ => None,
        };

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Guard conditions, not failures: nothing is published
                tracing::debug!(reason = %e, "Event ignored");
                return;
            }
        };

        if let Some((generation, kind)) = failure {
            tracing::info!(
                %generation,
                kind = kind.as_str(),
                "Showing failed request as error turn"
            );
        }

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::PublishSnapshot => {
                self.snapshot_tx.send_replace(Snapshot::of(&self.state));
            }
            Effect::RequestLlm {
                generation,
                messages,
            } => self.spawn_request(generation, messages),
        }
    }

    fn spawn_request(&self, generation: Generation, messages: Vec<Message>) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!(%generation, "No handles left, skipping LLM request");
            return;
        };
        let llm = Arc::clone(&self.llm);

        tokio::spawn(async move {
            tracing::debug!(
                %generation,
                messages = messages.len(),
                "Making LLM request (background)"
            );

            let event = match llm.complete(&messages).await {
                Ok(reply) => Event::LlmReply { generation, reply },
                Err(e) => Event::LlmError {
                    generation,
                    message: e.to_string(),
                    error_kind: e.kind,
                },
            };

            if event_tx.send(event).await.is_err() {
                tracing::debug!(%generation, "Runtime stopped before the reply arrived");
            }
        });
    }
}
