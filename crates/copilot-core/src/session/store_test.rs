#[cfg(test)]
mod tests {
    use crate::backend::{BackendResponse, ChatBackend, ChatRequest};
    use crate::error::{CopilotError, Result};
    use crate::session::message::MessageRole;
    use crate::session::store::{ConversationStore, MAX_TURNS};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    enum MockBehavior {
        Reply(BackendResponse),
        Fail(CopilotError),
        /// Signals `entered` when the exchange starts, then waits for
        /// `release` before replying.
        Blocked {
            entered: Arc<Notify>,
            release: Arc<Notify>,
            reply: BackendResponse,
        },
    }

    // Mock ChatBackend for testing
    struct MockBackend {
        calls: Arc<AtomicUsize>,
        behavior: MockBehavior,
    }

    impl MockBackend {
        fn replying(calls: Arc<AtomicUsize>, reply: BackendResponse) -> Self {
            Self {
                calls,
                behavior: MockBehavior::Reply(reply),
            }
        }

        fn failing(calls: Arc<AtomicUsize>, error: CopilotError) -> Self {
            Self {
                calls,
                behavior: MockBehavior::Fail(error),
            }
        }

        fn blocked(
            calls: Arc<AtomicUsize>,
            entered: Arc<Notify>,
            release: Arc<Notify>,
            reply: BackendResponse,
        ) -> Self {
            Self {
                calls,
                behavior: MockBehavior::Blocked {
                    entered,
                    release,
                    reply,
                },
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for MockBackend {
        async fn send_chat(&self, _request: &ChatRequest) -> Result<BackendResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Reply(reply) => Ok(reply.clone()),
                MockBehavior::Fail(error) => Err(error.clone()),
                MockBehavior::Blocked {
                    entered,
                    release,
                    reply,
                } => {
                    entered.notify_one();
                    release.notified().await;
                    Ok(reply.clone())
                }
            }
        }
    }

    fn ok_envelope(reply: &str) -> BackendResponse {
        BackendResponse {
            response: Some(reply.to_string()),
            intent: Some("default".to_string()),
            ..Default::default()
        }
    }

    fn user_message_count(messages: &[crate::session::message::Message]) -> usize {
        messages
            .iter()
            .filter(|message| message.role == MessageRole::User)
            .count()
    }

    #[tokio::test]
    async fn send_without_session_is_a_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::replying(calls.clone(), ok_envelope("hola")));

        let outcome = store.send("hola").await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(store.session().await.is_none());
    }

    #[tokio::test]
    async fn successful_exchange_grows_history_by_two() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::replying(
            calls.clone(),
            ok_envelope("buenas tardes"),
        ));
        store.init().await;

        let envelope = store.send("hola").await.unwrap().unwrap();
        assert_eq!(envelope.canonical_reply(), Some("buenas tardes"));

        let session = store.session().await.unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.turn_count, 1);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(session.messages[0].content, "hola");
        assert_eq!(session.messages[1].role, MessageRole::Assistant);
        assert_eq!(session.messages[1].content, "buenas tardes");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.error().await.is_none());
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn failed_exchange_keeps_user_message_and_records_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::failing(
            calls.clone(),
            CopilotError::backend(500, "internal".to_string()),
        ));
        store.init().await;

        let outcome = store.send("hola").await;
        assert!(outcome.is_err());

        let session = store.session().await.unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(session.turn_count, 1);
        assert!(store.error().await.unwrap().contains("500"));
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn envelope_without_response_field_takes_error_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let envelope = BackendResponse {
            content: Some("solo contenido alterno".to_string()),
            ..Default::default()
        };
        let store = ConversationStore::new(MockBackend::replying(calls.clone(), envelope));
        store.init().await;

        let outcome = store.send("hola").await;
        assert!(matches!(outcome, Err(ref err) if err.is_serialization()));

        let session = store.session().await.unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.turn_count, 1);
        assert!(store.error().await.is_some());
    }

    #[tokio::test]
    async fn capped_session_rejects_sends_without_backend_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::replying(calls.clone(), ok_envelope("ok")));
        store.init().await;

        for turn in 0..MAX_TURNS {
            let outcome = store.send(&format!("turno {turn}")).await.unwrap();
            assert!(outcome.is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TURNS as usize);
        assert!(store.is_capped().await);

        let before = store.session().await.unwrap();
        let rejected = store.send("uno mas").await.unwrap();

        assert!(rejected.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TURNS as usize);
        assert_eq!(store.session().await.unwrap(), before);
    }

    #[tokio::test]
    async fn turn_count_matches_user_messages_across_outcomes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::failing(
            calls.clone(),
            CopilotError::transport("connection refused".to_string()),
        ));
        store.init().await;

        let _ = store.send("uno").await;
        let _ = store.send("dos").await;

        let session = store.session().await.unwrap();
        assert_eq!(session.turn_count as usize, user_message_count(&session.messages));
        assert_eq!(session.turn_count, 2);
    }

    #[tokio::test]
    async fn reset_then_init_yields_fresh_session() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ConversationStore::new(MockBackend::replying(calls.clone(), ok_envelope("ok")));
        store.init().await;
        let first_id = store.session().await.unwrap().id;

        store.send("hola").await.unwrap();
        store.reset().await;
        assert!(store.session().await.is_none());
        assert!(store.error().await.is_none());

        store.init().await;
        let session = store.session().await.unwrap();
        assert_ne!(session.id, first_id);
        assert!(session.messages.is_empty());
        assert_eq!(session.turn_count, 0);
    }

    #[tokio::test]
    async fn in_flight_exchange_rejects_concurrent_send() {
        let calls = Arc::new(AtomicUsize::new(0));
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(ConversationStore::new(MockBackend::blocked(
            calls.clone(),
            entered.clone(),
            release.clone(),
            ok_envelope("tarde pero seguro"),
        )));
        store.init().await;

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.send("primera").await })
        };
        entered.notified().await;
        assert!(store.is_loading().await);

        // Second send while the first is still in flight: rejected, not queued.
        let second = store.send("segunda").await.unwrap();
        assert!(second.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(first.is_some());

        let session = store.session().await.unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.turn_count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
