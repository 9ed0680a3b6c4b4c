//! Session domain module.
//!
//! This module contains the session-related domain models and the
//! conversation store that drives turn exchanges.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `message`: Conversation message types (`Message`, `MessageRole`, `MessageMetadata`)
//! - `store`: Conversation lifecycle and exchange management (`ConversationStore`)

mod message;
mod model;
mod store;

#[cfg(test)]
mod store_test;

// Re-export public API
pub use message::{DEFAULT_INTENT, Message, MessageMetadata, MessageRole};
pub use model::Session;
pub use store::{ConversationStore, MAX_TURNS};
