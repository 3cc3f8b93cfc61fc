//! Startup configuration from the environment

use crate::llm::{Backend, LlmConfig};
use crate::state_machine::window::DEFAULT_MAX_TURNS;
use crate::system_prompt::Prompts;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_BASE: &str = "COPILOT_API_BASE";
pub const ENV_BACKEND: &str = "COPILOT_BACKEND";
pub const ENV_MAX_TURNS: &str = "COPILOT_MAX_TURNS";
pub const ENV_TIMEOUT_SECS: &str = "COPILOT_TIMEOUT_SECS";
pub const ENV_SYSTEM_PROMPT: &str = "COPILOT_SYSTEM_PROMPT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var}: unknown backend {value:?} (expected \"http\" or \"echo\")")]
    UnknownBackend { var: &'static str, value: String },
}

/// Everything needed to start a conversation
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub max_turns: usize,
    pub prompts: Prompts,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = LlmConfig::default();

        let backend = match lookup(ENV_BACKEND) {
            Some(raw) => raw.parse::<Backend>().map_err(|_| ConfigError::UnknownBackend {
                var: ENV_BACKEND,
                value: raw,
            })?,
            None => defaults.backend,
        };

        let api_base = lookup(ENV_API_BASE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);

        let timeout_secs = parse_positive(&lookup, ENV_TIMEOUT_SECS, defaults.timeout.as_secs())?;
        let max_turns = parse_positive(&lookup, ENV_MAX_TURNS, DEFAULT_MAX_TURNS)?;
        let system_prompt = lookup(ENV_SYSTEM_PROMPT);

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_base,
                timeout: Duration::from_secs(timeout_secs),
            },
            max_turns,
            prompts: Prompts::new(system_prompt.as_deref()),
        })
    }
}

/// Parse a strictly positive integer, or fall back to `default` when unset
fn parse_positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}
