//! Domain layer for the Copilot terminal chat client.
//!
//! This crate owns the conversation model (sessions, messages, the turn
//! cap), the backend protocol contract, the pure response-rendering
//! pipeline, and the builtin slash commands. Transport lives in
//! `copilot-interaction`; presentation lives in `copilot-readline`.

pub mod backend;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod slash_command;

// Re-export common error type
pub use error::{CopilotError, Result};
pub use session::MAX_TURNS;
