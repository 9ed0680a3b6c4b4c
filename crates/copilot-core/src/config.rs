//! Process-wide client configuration.
//!
//! The backend endpoint is resolved once at startup and injected into the
//! HTTP layer; nothing else reads the environment afterwards.

use serde::{Deserialize, Serialize};
use std::env;

/// Development default used when no endpoint is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "COPILOT_BACKEND_URL";

/// Connection settings for the chat backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API (without the `/chat` suffix).
    pub base_url: String,
}

impl BackendConfig {
    /// Creates a configuration pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Resolves the configuration from the environment.
    ///
    /// Reads `COPILOT_BACKEND_URL`, falling back to the local development
    /// address when unset or empty.
    pub fn from_env() -> Self {
        let base_url = env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        tracing::debug!(base_url = %base_url, "resolved backend configuration");
        Self { base_url }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
