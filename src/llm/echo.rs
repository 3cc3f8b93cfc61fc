//! Offline backend that echoes the latest user turn

use super::types::{Message, Role};
use super::{LlmError, LlmService};
use async_trait::async_trait;

/// Replies with `You said: <text>` for the most recent user message.
///
/// Useful for exercising the conversation loop without a running backend.
#[derive(Debug, Default)]
pub struct EchoService;

impl EchoService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmService for EchoService {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| format!("You said: {}", m.content))
            .ok_or_else(|| LlmError::invalid_request("No user message to echo"))
    }

    fn endpoint(&self) -> &str {
        "echo"
    }
}
