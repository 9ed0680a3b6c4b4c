//! Chat backend protocol types.
//!
//! Defines the wire contract with the remote assistant backend and the
//! `ChatBackend` trait that decouples the conversation store from the
//! concrete HTTP implementation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body for one chat turn, `POST {base_url}/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Raw user input, including any leading slash-command intent.
    pub user_input: String,
    /// Identifier of the session this turn belongs to.
    pub session_id: String,
}

/// The loosely-typed reply envelope returned by the backend.
///
/// Every field is optional: the backend has shipped replies under several
/// alternative field names over time, so the envelope models presence
/// explicitly instead of trusting any single shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    /// The documented primary reply field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Intent tag selecting a specialized rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
    /// Exchange latency in milliseconds, as reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    /// True when a degraded backend code path produced the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    // Alternate reply-text fields observed in the wild. Consulted only for
    // display-level fallback, never for the stored message content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BackendResponse {
    /// The canonical reply text for message history: the `response` field
    /// only. An envelope without it is treated as malformed by the store.
    pub fn canonical_reply(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Best-effort reply text for display-level fallback, consulting the
    /// alternate fields in fixed precedence: `response`, `content`, `text`,
    /// `message`.
    pub fn display_text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or(self.content.as_deref())
            .or(self.text.as_deref())
            .or(self.message.as_deref())
    }

    /// True when the backend flagged this reply as produced by a degraded
    /// code path.
    pub fn is_fallback(&self) -> bool {
        self.fallback.unwrap_or(false)
    }
}

/// An abstract chat backend that exchanges one turn at a time.
///
/// This trait decouples the conversation store from the transport, so tests
/// can drive the store with an in-memory implementation while the binary
/// injects the reqwest-based one.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one chat turn and returns the parsed reply envelope.
    ///
    /// # Returns
    ///
    /// - `Ok(BackendResponse)`: the backend answered 2xx with a parseable envelope
    /// - `Err(_)`: non-success status, transport failure, or malformed body
    async fn send_chat(&self, request: &ChatRequest) -> Result<BackendResponse>;
}
