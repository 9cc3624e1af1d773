use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use toba_chat::config::{EmbeddingConfig, LlmConfig, MessagesConfig};
use toba_chat::embedding::OllamaEmbedder;
use toba_chat::llm::{LlmError, OllamaClient};
use toba_chat_core::embedding::QueryEmbedder;
use toba_chat_core::llm::{LanguageModel, EMPTY_RESPONSE, TRANSPORT_APOLOGY};

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    reply: Value,
    delay: Duration,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl Mock {
    fn new(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            delay: Duration::ZERO,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(State(mock): State<Mock>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    mock.requests.lock().unwrap().push(body);
    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }
    (mock.status, Json(mock.reply.clone()))
}

/// Serve the mock on an ephemeral port and return its base URL.
async fn serve(mock: Mock) -> String {
    let app = Router::new()
        .route("/api/generate", post(handle))
        .route("/api/embed", post(handle))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, timeout_secs: u64) -> OllamaClient {
    let config = LlmConfig {
        base_url: base_url.to_string(),
        model: "llama3".to_string(),
        timeout_secs,
    };
    OllamaClient::new(&config, &MessagesConfig::default()).unwrap()
}

#[tokio::test]
async fn test_generate_sends_non_streaming_request() {
    let mock = Mock::new(StatusCode::OK, json!({"model": "llama3", "response": "Halo juga!", "done": true}));
    let url = serve(mock.clone()).await;

    let answer = client(&url, 10).generate("Halo", Some("Anda adalah chatbot.")).await;
    assert_eq!(answer, "Halo juga!");

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        json!({"model": "llama3", "prompt": "Halo", "system": "Anda adalah chatbot.", "stream": false})
    );
}

#[tokio::test]
async fn test_missing_response_field() {
    let url = serve(Mock::new(StatusCode::OK, json!({"done": true}))).await;
    assert_eq!(client(&url, 10).generate("Halo", None).await, EMPTY_RESPONSE);
}

#[tokio::test]
async fn test_server_error_is_a_status_error() {
    let url = serve(Mock::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "model crashed"}),
    ))
    .await;
    let client = client(&url, 10);

    match client.try_generate("Halo", None).await {
        Err(LlmError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model crashed"));
        }
        other => panic!("expected status error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(client.generate("Halo", None).await, TRANSPORT_APOLOGY);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mut mock = Mock::new(StatusCode::OK, json!({"response": "terlambat"}));
    mock.delay = Duration::from_secs(3);
    let url = serve(mock).await;
    let client = client(&url, 1);

    assert!(matches!(
        client.try_generate("Halo", None).await,
        Err(LlmError::Timeout(1))
    ));
    assert_eq!(client.generate("Halo", None).await, TRANSPORT_APOLOGY);
}

#[tokio::test]
async fn test_embedder_reads_first_embedding() {
    let mock = Mock::new(StatusCode::OK, json!({"embeddings": [[0.25, 0.5, 1.0]]}));
    let url = serve(mock.clone()).await;
    let config = EmbeddingConfig {
        provider: "ollama".to_string(),
        url,
        ..EmbeddingConfig::default()
    };

    let embedder = OllamaEmbedder::new(&config).unwrap();
    let vector = embedder.embed_query("kain tenun").await.unwrap();
    assert_eq!(vector, vec![0.25, 0.5, 1.0]);
    assert_eq!(
        mock.requests()[0],
        json!({"model": "nomic-embed-text", "input": ["kain tenun"]})
    );
}

#[tokio::test]
async fn test_embedder_retries_server_errors_then_fails() {
    let mock = Mock::new(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "loading"}));
    let url = serve(mock.clone()).await;
    let config = EmbeddingConfig {
        provider: "ollama".to_string(),
        url,
        max_retries: 2,
        ..EmbeddingConfig::default()
    };

    let embedder = OllamaEmbedder::new(&config)
        .unwrap()
        .with_base_delay(Duration::from_millis(10));
    assert!(embedder.embed_query("kain").await.is_err());
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn test_embedder_does_not_retry_client_errors() {
    let mock = Mock::new(StatusCode::NOT_FOUND, json!({"error": "model not found"}));
    let url = serve(mock.clone()).await;
    let config = EmbeddingConfig {
        provider: "ollama".to_string(),
        url,
        ..EmbeddingConfig::default()
    };

    let embedder = OllamaEmbedder::new(&config)
        .unwrap()
        .with_base_delay(Duration::from_millis(10));
    let err = embedder.embed_query("kain").await.unwrap_err();
    assert!(err.to_string().contains("404"));
    assert_eq!(mock.requests().len(), 1);
}
