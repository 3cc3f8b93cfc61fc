//! Backend selection

use super::{BackendService, EchoService, LlmError, LlmService, LoggingService};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default base address of the completion backend
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Which backend answers completion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// The HTTP chat endpoint
    #[default]
    Http,
    /// Offline echo, no network
    Echo,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "echo" => Ok(Self::Echo),
            other => Err(other.to_string()),
        }
    }
}

/// Configuration for the completion backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: Backend,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Build the configured backend, wrapped with request logging
pub fn create_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let inner: Arc<dyn LlmService> = match config.backend {
        Backend::Http => Arc::new(BackendService::new(&config.api_base, config.timeout)?),
        Backend::Echo => Arc::new(EchoService::new()),
    };
    Ok(Arc::new(LoggingService::new(inner)))
}
