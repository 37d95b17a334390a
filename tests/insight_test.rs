//! Integration tests for insight requests against an in-process text service

#[cfg(feature = "insight")]
mod insight_tests {
    use axum::{
        http::{HeaderMap, StatusCode, Uri},
        Json, Router,
    };
    use cardiotrack::insight::{EMPTY_REPLY_MESSAGE, FAILURE_MESSAGE, NO_DATA_MESSAGE};
    use cardiotrack::{DisplayZone, InsightClient, InsightConfig, InsightError, Observation};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    type Log = Arc<Mutex<Vec<Captured>>>;

    /// Start a text service answering every request with `status` and `reply`.
    async fn start_service(status: StatusCode, reply: Value) -> (SocketAddr, Log, oneshot::Sender<()>) {
        let log: Log = Arc::default();
        let captured = log.clone();

        let app = Router::new().fallback(
            move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| async move {
                captured.lock().unwrap().push(Captured {
                    path: uri.path().to_string(),
                    api_key: headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    body,
                });
                (status, Json(reply))
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind service");
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Service error");
        });

        (addr, log, shutdown_tx)
    }

    fn client_for(addr: SocketAddr) -> InsightClient {
        let config = InsightConfig {
            endpoint: format!("http://{addr}/v1beta/"),
            model: "test-model".to_string(),
            api_key_env: "CARDIOTRACK_TEST_UNUSED".to_string(),
        };
        InsightClient::new(&config, "secret-key", DisplayZone::Named(chrono_tz::UTC)).unwrap()
    }

    fn records() -> Vec<Observation> {
        vec![
            Observation::new(142, 91, 81, 0, None),
            Observation::new(128, 84, 72, 0, None),
        ]
    }

    #[tokio::test]
    async fn test_request_returns_model_text() {
        let reply = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Readings are stable." }] } }]
        });
        let (addr, log, shutdown_tx) = start_service(StatusCode::OK, reply).await;
        let client = client_for(addr);

        let text = client.request(&records()).await.unwrap();
        assert_eq!(text, "Readings are stable.");

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/v1beta/models/test-model:generateContent");
        assert_eq!(calls[0].api_key.as_deref(), Some("secret-key"));

        let prompt = calls[0].body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(prompt.contains("BP: 142/91, Pulse: 81"));
        assert!(prompt.contains("BP: 128/84, Pulse: 72"));
        assert!(calls[0].body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Do not provide medical diagnosis"));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let (addr, _log, shutdown_tx) = start_service(StatusCode::OK, json!({ "candidates": [] })).await;

        let text = client_for(addr).request(&records()).await.unwrap();
        assert_eq!(text, EMPTY_REPLY_MESSAGE);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let (addr, _log, shutdown_tx) =
            start_service(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
        let client = client_for(addr);

        let err = client.request(&records()).await.unwrap_err();
        assert!(matches!(err, InsightError::Server { status: 500, .. }));
        assert_eq!(client.analyze_trends(&records()).await, FAILURE_MESSAGE);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_no_records_skips_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let text = client_for(addr).request(&[]).await.unwrap();
        assert_eq!(text, NO_DATA_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let config = InsightConfig {
            api_key_env: "CARDIOTRACK_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..InsightConfig::default()
        };
        let result = InsightClient::from_env(&config, DisplayZone::Local);
        assert!(matches!(result, Err(InsightError::MissingApiKey(_))));
    }
}
