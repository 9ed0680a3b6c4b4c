//! Conversation store: session lifecycle and turn exchange.
//!
//! The store owns at most one [`Session`] at a time and runs at most one
//! backend exchange at a time. Mutations commit a fully-built replacement
//! session under the write lock, so readers never observe a half-applied
//! turn.

use super::message::{Message, MessageMetadata};
use super::model::Session;
use crate::backend::{BackendResponse, ChatBackend, ChatRequest};
use crate::error::{CopilotError, Result};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Maximum number of accepted user turns per session.
pub const MAX_TURNS: u32 = 20;

#[derive(Default)]
struct StoreState {
    session: Option<Session>,
    loading: bool,
    error: Option<String>,
}

/// Manages the active conversation session and its exchanges with the
/// backend.
///
/// `ConversationStore` is responsible for:
/// - Creating and discarding sessions
/// - Enforcing the per-session turn cap
/// - Running exactly one backend exchange at a time
/// - Merging request/response pairs into the message history
pub struct ConversationStore<B: ChatBackend> {
    backend: B,
    state: RwLock<StoreState>,
}

impl<B: ChatBackend> ConversationStore<B> {
    /// Creates a store with no active session.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Creates a fresh session, replacing any prior one, and clears error
    /// state. Makes no network call.
    pub async fn init(&self) {
        let session = Session::new();
        debug!(session_id = %session.id, "session initialized");

        let mut state = self.state.write().await;
        state.session = Some(session);
        state.error = None;
    }

    /// Discards the session entirely, clearing error and in-flight state.
    ///
    /// An exchange already in flight is not cancelled; it completes against
    /// the pending session captured at send time and its commit replaces
    /// whatever state exists then.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.session = None;
        state.error = None;
        state.loading = false;
        debug!("session discarded");
    }

    /// Sends one user turn to the backend.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(envelope))`: the exchange succeeded; history grew by the
    ///   user message and the assistant reply. The raw envelope is returned
    ///   so the caller can inspect auxiliary fields (`fallback`,
    ///   `display_text()`) that are not persisted into the message.
    /// - `Ok(None)`: the turn was rejected without touching the network:
    ///   no session exists, an exchange is already in flight, or the turn
    ///   cap is reached. The session is unchanged.
    /// - `Err(_)`: the exchange failed (backend, transport, or envelope
    ///   shape). The user message is kept, no assistant message is
    ///   appended, and a human-readable error string is recorded.
    pub async fn send(&self, text: &str) -> Result<Option<BackendResponse>> {
        let (pending, request) = {
            let mut state = self.state.write().await;

            let Some(session) = state.session.as_ref() else {
                return Ok(None);
            };
            if state.loading {
                debug!("send rejected: exchange already in flight");
                return Ok(None);
            }
            if session.turn_count >= MAX_TURNS {
                debug!(turn_count = session.turn_count, "send rejected: turn cap reached");
                return Ok(None);
            }

            let request = ChatRequest {
                user_input: text.to_string(),
                session_id: session.id.clone(),
            };
            let pending = session.with_message(Message::user(text));

            state.loading = true;
            state.error = None;
            (pending, request)
        };

        // The only suspension point: exactly one exchange runs here at a
        // time, with no timeout and no cancellation.
        let result = self.backend.send_chat(&request).await;

        let mut state = self.state.write().await;
        state.loading = false;

        match result {
            Ok(envelope) => {
                let Some(reply) = envelope.canonical_reply().map(str::to_string) else {
                    let err = CopilotError::serialization(
                        "JSON",
                        "reply envelope is missing the `response` field",
                    );
                    warn!(session_id = %request.session_id, "malformed reply envelope");
                    state.error = Some(err.to_string());
                    state.session = Some(pending);
                    return Err(err);
                };

                let assistant = Message::assistant(reply, MessageMetadata::from_envelope(&envelope));
                state.session = Some(pending.with_message(assistant));
                Ok(Some(envelope))
            }
            Err(err) => {
                warn!(session_id = %request.session_id, error = %err, "chat exchange failed");
                state.error = Some(err.to_string());
                state.session = Some(pending);
                Err(err)
            }
        }
    }

    /// A cloned snapshot of the active session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    /// The recorded error string from the last failed exchange, if any.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// True while an exchange is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Number of accepted user turns in the active session (0 without one).
    pub async fn turn_count(&self) -> u32 {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|session| session.turn_count)
            .unwrap_or(0)
    }

    /// True once the active session has exhausted its turn cap.
    pub async fn is_capped(&self) -> bool {
        self.turn_count().await >= MAX_TURNS
    }
}
