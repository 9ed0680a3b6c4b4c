//! HttpChatBackend - reqwest implementation of the chat backend seam.
//!
//! Posts one turn at a time to `POST {base_url}/chat` and maps transport,
//! status, and body-shape failures onto `CopilotError`. No retries and no
//! request timeout: every failure is terminal for its turn.

use async_trait::async_trait;
use copilot_core::backend::{BackendResponse, ChatBackend, ChatRequest};
use copilot_core::config::BackendConfig;
use copilot_core::error::{CopilotError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

/// Chat backend implementation that talks to the assistant over HTTP.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Creates a backend for the configured base URL.
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<BackendResponse> {
        debug!(session_id = %request.session_id, "posting chat turn");

        let response = self
            .client
            .post(self.chat_url())
            .json(request)
            .send()
            .await
            .map_err(|err| CopilotError::transport(format!("chat request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "backend returned error status");
            return Err(map_http_error(status, body));
        }

        let envelope: BackendResponse = response.json().await.map_err(|err| {
            CopilotError::serialization("JSON", format!("failed to parse reply envelope: {err}"))
        })?;

        debug!(
            intent = envelope.intent.as_deref().unwrap_or("default"),
            fallback = envelope.is_fallback(),
            "received reply envelope"
        );
        Ok(envelope)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "message")]
    detail: Option<String>,
}

/// Maps a non-success status onto a backend error, extracting a message
/// from the body on a best-effort basis. The body is never required to
/// parse.
fn map_http_error(status: StatusCode, body: String) -> CopilotError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .unwrap_or(body);

    CopilotError::backend(status.as_u16(), message)
}
