//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::{spawn, ConversationHandle};
use crate::llm::{LlmError, LlmService, Message};
use crate::state_machine::{ContextWindow, ConvContext, ConvState};
use crate::view::Snapshot;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify, Semaphore};
use tokio::task::JoinHandle;

pub const GREETING: &str = "Hi! I can remember our conversation now.";
pub const RESET_GREETING: &str = "New chat. What topic are you studying today?";
pub const SYSTEM: &str = "You are a helpful study copilot.";

/// Upper bound for any single wait in these tests
const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    fn record_and_pop(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.record_and_pop(messages)
    }

    fn endpoint(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Gated Mock LLM Service (for in-flight timing)
// ============================================================================

/// Mock that takes its response when called but holds it until released
pub struct GatedMockLlmService {
    inner: MockLlmService,
    gate: Semaphore,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl GatedMockLlmService {
    pub fn new() -> Self {
        Self {
            inner: MockLlmService::new(),
            gate: Semaphore::new(0),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.inner.queue_reply(reply);
    }

    /// Let `n` held requests complete
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.inner.recorded_requests()
    }

    /// Wait until a request has reached the gate
    pub async fn wait_started(&self) {
        tokio::time::timeout(WAIT_TIMEOUT, self.request_started.notified())
            .await
            .expect("LLM request should start");
    }
}

#[async_trait]
impl LlmService for GatedMockLlmService {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let response = self.inner.record_and_pop(messages);
        self.request_started.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|_| LlmError::network("Gate closed"))?
            .forget();
        response
    }

    fn endpoint(&self) -> &str {
        "gated-mock"
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// A running conversation plus the mock behind it
pub struct TestRuntime<L: LlmService + 'static> {
    pub handle: ConversationHandle,
    pub llm: Arc<L>,
    updates: watch::Receiver<Snapshot>,
    _runtime_handle: JoinHandle<()>,
}

impl<L: LlmService + 'static> TestRuntime<L> {
    pub fn start(llm: L, max_turns: usize) -> Self {
        let llm = Arc::new(llm);
        let context = ConvContext::new(
            ContextWindow::new(max_turns, SYSTEM).unwrap(),
            RESET_GREETING,
        );
        let (handle, task) = spawn(context, ConvState::new(GREETING), Arc::clone(&llm));
        let updates = handle.subscribe();

        Self {
            handle,
            llm,
            updates,
            _runtime_handle: task,
        }
    }

    pub async fn submit(&self, text: &str) {
        self.handle.submit(text).await.unwrap();
    }

    pub async fn reset(&self) {
        self.handle.reset().await.unwrap();
    }

    pub fn history(&self) -> Vec<Message> {
        self.handle.snapshot().history
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(&mut self, predicate: impl FnMut(&Snapshot) -> bool) -> bool {
        tokio::time::timeout(WAIT_TIMEOUT, self.updates.wait_for(predicate))
            .await
            .is_ok_and(|r| r.is_ok())
    }

    /// Wait until the conversation is idle with `len` turns
    pub async fn wait_for_idle(&mut self, len: usize) -> bool {
        self.wait_for(|s| !s.in_flight && s.history.len() == len).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[tokio::test]
    async fn test_mock_llm_service() {
        let mock = MockLlmService::new();
        mock.queue_reply("Hello");

        let reply = mock.complete(&[Message::user("Hi")]).await.unwrap();
        assert_eq!(reply, "Hello");

        // Second call should fail (no more responses)
        let result = mock.complete(&[Message::user("Hi")]).await;
        assert!(result.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_simple_reply() {
        let llm = MockLlmService::new();
        llm.queue_reply("Hello!");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("Hi").await;

        assert!(rt.wait_for_idle(3).await);
        assert_eq!(
            rt.history(),
            vec![
                Message::assistant(GREETING),
                Message::user("Hi"),
                Message::assistant("Hello!"),
            ]
        );
        assert_eq!(
            rt.llm.recorded_requests(),
            vec![vec![
                Message::system(SYSTEM),
                Message::assistant(GREETING),
                Message::user("Hi"),
            ]]
        );
    }

    #[tokio::test]
    async fn test_error_converges_to_idle() {
        let llm = MockLlmService::new();
        llm.queue_error(LlmError::from_status(500, "Internal Server Error"));

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("Hi").await;

        assert!(rt.wait_for_idle(3).await);
        let history = rt.history();
        let last = history.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Error: HTTP 500: Internal Server Error");

        // The conversation keeps working afterwards
        rt.llm.queue_reply("Back online");
        rt.submit("Retry").await;
        assert!(rt.wait_for_idle(5).await);
        assert_eq!(rt.history().last(), Some(&Message::assistant("Back online")));
    }

    #[tokio::test]
    async fn test_user_turn_published_before_reply() {
        let llm = GatedMockLlmService::new();
        llm.queue_reply("Later");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("Question").await;

        assert!(
            rt.wait_for(|s| s.in_flight && s.history.last() == Some(&Message::user("Question")))
                .await
        );

        rt.llm.release(1);
        assert!(rt.wait_for_idle(3).await);
        assert_eq!(rt.history().last(), Some(&Message::assistant("Later")));
    }

    #[tokio::test]
    async fn test_second_submit_while_awaiting_is_ignored() {
        let llm = GatedMockLlmService::new();
        llm.queue_reply("First answer");
        llm.queue_reply("Should never be used");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("first").await;
        rt.llm.wait_started().await;

        // Queued ahead of the reply, so it is seen while still awaiting
        rt.submit("second").await;
        rt.llm.release(1);

        assert!(rt.wait_for_idle(3).await);
        assert_eq!(rt.llm.recorded_requests().len(), 1);
        assert!(rt.history().iter().all(|m| m.content != "second"));
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_reply() {
        let llm = GatedMockLlmService::new();
        llm.queue_reply("stale answer");
        llm.queue_reply("fresh answer");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("hi").await;
        rt.llm.wait_started().await;

        rt.reset().await;
        assert!(
            rt.wait_for(|s| !s.in_flight && s.history == vec![Message::assistant(RESET_GREETING)])
                .await
        );

        rt.llm.release(1);
        rt.submit("next").await;
        rt.llm.release(1);

        assert!(rt.wait_for_idle(3).await);
        assert_eq!(
            rt.history(),
            vec![
                Message::assistant(RESET_GREETING),
                Message::user("next"),
                Message::assistant("fresh answer"),
            ]
        );

        // The second request was built from the post-reset history
        let requests = rt.llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            vec![
                Message::system(SYSTEM),
                Message::assistant(RESET_GREETING),
                Message::user("next"),
            ]
        );
    }

    #[tokio::test]
    async fn test_reset_after_exchange() {
        let llm = MockLlmService::new();
        llm.queue_reply("hello");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("hi").await;
        assert!(rt.wait_for_idle(3).await);

        rt.reset().await;
        assert!(rt.wait_for_idle(1).await);
        assert_eq!(rt.history(), vec![Message::assistant(RESET_GREETING)]);
    }

    #[tokio::test]
    async fn test_repeated_exchange_advances_turn_count() {
        let llm = MockLlmService::new();
        llm.queue_reply("You said: hi");
        llm.queue_reply("You said: hi");

        let mut rt = TestRuntime::start(llm, 2);
        rt.submit("hi").await;
        assert!(rt.wait_for(|s| !s.in_flight && s.turns_added == 3).await);
        let first = rt.history();

        rt.submit("hi").await;
        assert!(rt.wait_for(|s| !s.in_flight && s.turns_added == 5).await);
        assert_eq!(rt.history(), first);
    }

    #[tokio::test]
    async fn test_window_applied_end_to_end() {
        let llm = MockLlmService::new();
        llm.queue_reply("B");
        llm.queue_reply("D");

        let mut rt = TestRuntime::start(llm, 3);
        rt.submit("A").await;
        assert!(
            rt.wait_for(|s| !s.in_flight && s.history.last() == Some(&Message::assistant("B")))
                .await
        );
        rt.submit("C").await;
        assert!(
            rt.wait_for(|s| !s.in_flight && s.history.last() == Some(&Message::assistant("D")))
                .await
        );

        assert_eq!(
            rt.history(),
            vec![
                Message::assistant("B"),
                Message::user("C"),
                Message::assistant("D"),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_submission_ignored() {
        let llm = MockLlmService::new();
        llm.queue_reply("answer");

        let mut rt = TestRuntime::start(llm, 10);
        rt.submit("   ").await;
        rt.submit("real question").await;

        assert!(rt.wait_for_idle(3).await);
        assert_eq!(rt.llm.recorded_requests().len(), 1);
        assert_eq!(rt.history()[1], Message::user("real question"));
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_dropped() {
        let context = ConvContext::new(ContextWindow::new(10, SYSTEM).unwrap(), RESET_GREETING);
        let (handle, task) = spawn(
            context,
            ConvState::new(GREETING),
            Arc::new(MockLlmService::new()),
        );

        drop(handle);
        assert!(tokio::time::timeout(WAIT_TIMEOUT, task).await.is_ok());
    }
}
