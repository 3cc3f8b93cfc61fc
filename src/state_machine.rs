//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
pub mod window;


pub use effect::Effect;
pub use event::Event;
pub use state::{ConvContext, ConvState, Generation, Phase};
pub use transition::transition;
pub use window::ContextWindow;
