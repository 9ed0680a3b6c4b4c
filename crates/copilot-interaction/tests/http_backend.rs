//! Contract tests for the HTTP chat backend against a local mock server.

use copilot_core::backend::{ChatBackend, ChatRequest};
use copilot_core::config::BackendConfig;
use copilot_interaction::HttpChatBackend;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatRequest {
    ChatRequest {
        user_input: "/recordatorio llamar al medico".to_string(),
        session_id: "11111111-2222-3333-4444-555555555555".to_string(),
    }
}

#[tokio::test]
async fn posts_turn_and_parses_reply_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "user_input": "/recordatorio llamar al medico",
            "session_id": "11111111-2222-3333-4444-555555555555",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Listo. {\"fecha_ejecucion\":\"2024-05-01T09:30:00\",\"descripcion\":\"llamar\"}",
            "intent": "recordatorio",
            "session_id": "11111111-2222-3333-4444-555555555555",
            "provider": "openai",
            "model": "gpt-4o-mini",
            "latency": 640.2,
            "fallback": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(&BackendConfig::new(format!("{}/api", server.uri())));
    let envelope = backend.send_chat(&request()).await.unwrap();

    assert_eq!(
        envelope.canonical_reply(),
        Some("Listo. {\"fecha_ejecucion\":\"2024-05-01T09:30:00\",\"descripcion\":\"llamar\"}")
    );
    assert_eq!(envelope.intent.as_deref(), Some("recordatorio"));
    assert!(!envelope.is_fallback());
}

#[tokio::test]
async fn non_success_status_maps_to_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "provider unavailable"})),
        )
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(&BackendConfig::new(format!("{}/api", server.uri())));
    let err = backend.send_chat(&request()).await.unwrap_err();

    assert!(err.is_backend());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn malformed_reply_body_maps_to_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("no soy json"))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(&BackendConfig::new(format!("{}/api", server.uri())));
    let err = backend.send_chat(&request()).await.unwrap_err();

    assert!(err.is_serialization());
}

#[tokio::test]
async fn unreachable_backend_maps_to_transport_error() {
    // Port 9 (discard) is not listening locally.
    let backend = HttpChatBackend::new(&BackendConfig::new("http://127.0.0.1:9/api"));
    let err = backend.send_chat(&request()).await.unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "hola"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(&BackendConfig::new(format!("{}/api/", server.uri())));
    let envelope = backend.send_chat(&request()).await.unwrap();

    assert_eq!(envelope.canonical_reply(), Some("hola"));
}
