//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, content, and assistant reply metadata.

use crate::backend::BackendResponse;
use serde::{Deserialize, Serialize};

/// Intent tag applied when the backend does not report one.
pub const DEFAULT_INTENT: &str = "default";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// Auxiliary information attached to assistant messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Intent tag selecting the rendering (defaults to `"default"`).
    #[serde(default = "default_intent")]
    pub intent: String,
    /// Model name reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Provider name reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Exchange latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// True when the backend used a degraded code path for this reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

fn default_intent() -> String {
    DEFAULT_INTENT.to_string()
}

impl MessageMetadata {
    /// Builds assistant metadata from a reply envelope.
    pub fn from_envelope(envelope: &BackendResponse) -> Self {
        Self {
            intent: envelope
                .intent
                .clone()
                .unwrap_or_else(|| DEFAULT_INTENT.to_string()),
            model: envelope.model.clone(),
            provider: envelope.provider.clone(),
            latency_ms: envelope.latency,
            fallback: envelope.fallback,
        }
    }
}

/// A single message in a conversation history.
///
/// Messages are immutable once created; the session replaces its history
/// wholesale instead of editing entries in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format).
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The raw content of the message. Assistant content may itself embed a
    /// JSON fragment; interpretation is left to the renderer.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Assistant-only reply metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Creates a user message from raw input text.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            metadata: None,
        }
    }

    /// Creates an assistant message with reply metadata.
    pub fn assistant(content: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            metadata: Some(metadata),
        }
    }

    /// The intent tag used to render this message.
    pub fn intent(&self) -> &str {
        self.metadata
            .as_ref()
            .map(|meta| meta.intent.as_str())
            .unwrap_or(DEFAULT_INTENT)
    }
}
