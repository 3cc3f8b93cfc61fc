//! Prompt texts for a study copilot conversation
//!
//! The system directive is prepended to every request. The greetings seed the
//! history at startup and after a reset; they are ordinary assistant turns and
//! can be evicted like any other.

/// Base system prompt establishing the assistant's role
pub const BASE_PROMPT: &str = "You are a helpful study copilot.";

/// First assistant turn of a new session
pub const INITIAL_GREETING: &str =
    "Hi! I can remember our conversation now. Tell me what you're studying.";

/// Assistant turn that replaces the history on reset
pub const RESET_GREETING: &str = "New chat. What topic are you studying today?";

/// Texts a conversation is configured with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub greeting: String,
    pub reset_greeting: String,
}

impl Prompts {
    pub fn new(custom_system: Option<&str>) -> Self {
        Self {
            system: build_system_prompt(custom_system),
            greeting: INITIAL_GREETING.to_string(),
            reset_greeting: RESET_GREETING.to_string(),
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Use the custom prompt when it has content, otherwise the base prompt
pub fn build_system_prompt(custom: Option<&str>) -> String {
    custom
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(BASE_PROMPT)
        .to_string()
}
