//! HTTP backend: `POST {base}/api/chat_llm` with `{ "messages": [...] }`

use super::types::Message;
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path of the multi-turn chat endpoint, relative to the API base
pub const CHAT_PATH: &str = "/api/chat_llm";

/// Client for the study copilot backend
pub struct BackendService {
    client: Client,
    url: String,
}

impl BackendService {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}{CHAT_PATH}", api_base.trim_end_matches('/')),
        })
    }

    fn normalize_response(body: &str) -> Result<String, LlmError> {
        serde_json::from_str::<ChatReply>(body)
            .map(|r| r.reply)
            .map_err(|e| LlmError::malformed_response(format!("Invalid response body: {e}")))
    }
}

#[async_trait]
impl LlmService for BackendService {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        Self::normalize_response(&body)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}
