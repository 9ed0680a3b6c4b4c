//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! conversation with the assistant backend.

use super::message::{Message, MessageRole};
use serde::{Deserialize, Serialize};

/// Represents one conversation session in the client's domain layer.
///
/// A session contains:
/// - The ordered message history (insertion order = display order)
/// - The number of accepted user turns
/// - Timestamps for creation and last update
///
/// Sessions are replaced wholesale on every mutation rather than edited in
/// place, so readers always observe a consistent snapshot.
///
/// Invariant: `turn_count` equals the number of `User` messages in
/// `messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// Append-only conversation history.
    pub messages: Vec<Message>,
    /// Number of accepted user messages (assistant replies do not count).
    pub turn_count: u32,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Timestamp of the last mutation (ISO 8601 format).
    pub updated_at: String,
}

impl Session {
    /// Creates a fresh session with empty history and a new identifier.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            turn_count: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Returns a copy of this session with the message appended.
    ///
    /// User messages bump `turn_count`; assistant messages do not.
    /// `updated_at` is refreshed either way.
    pub fn with_message(&self, message: Message) -> Self {
        let mut next = self.clone();
        if message.role == MessageRole::User {
            next.turn_count += 1;
        }
        next.messages.push(message);
        next.updated_at = chrono::Utc::now().to_rfc3339();
        next
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
