//! HTTP transport layer for the Copilot terminal chat client.

mod http_backend;

pub use http_backend::HttpChatBackend;
