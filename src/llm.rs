//! Completion backend abstraction
//!
//! The conversation runtime only needs one call: given the ordered turns,
//! return the assistant's reply or a classified failure.

mod echo;
mod error;
mod http;
mod registry;
mod types;

pub use echo::EchoService;
pub use error::{LlmError, LlmErrorKind};
pub use http::BackendService;
pub use registry::{create_service, Backend, LlmConfig};
pub use types::{Message, Role};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for completion backends
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Send the full request sequence and return the reply text
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Human-readable description of where requests go
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(messages).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    reply_chars = reply.chars().count(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        (**self).complete(messages).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
