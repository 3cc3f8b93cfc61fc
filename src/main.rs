//! AI Study Copilot - terminal chat client
//!
//! Keeps a bounded, multi-turn conversation with a completion backend and
//! renders it line by line in the terminal.

mod config;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod terminal;
mod view;

use config::Config;
use llm::LlmService;
use state_machine::{ContextWindow, ConvContext, ConvState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_copilot=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = Config::from_env()?;
    let llm = llm::create_service(&config.llm)?;

    tracing::info!(
        backend = ?config.llm.backend,
        endpoint = %llm.endpoint(),
        max_turns = config.max_turns,
        "Configuration loaded"
    );

    let window = ContextWindow::new(config.max_turns, config.prompts.system.as_str())?;
    let context = ConvContext::new(window, config.prompts.reset_greeting.as_str());
    let state = ConvState::new(config.prompts.greeting.as_str());

    let (handle, runtime_task) = runtime::spawn(context, state, llm);
    terminal::run(handle).await?;

    // A reply still in flight has nowhere to go now
    runtime_task.abort();
    Ok(())
}
