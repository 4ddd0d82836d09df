//! HTTP API: `/generate`, `/ask` and `/health`.
//!
//! Handlers only parse the body, delegate to a service and map the outcome to
//! a status code. Both POST endpoints take `{"prompt": "..."}` and answer with
//! `{"generated": "..."}` or `{"error": "..."}`.

use crate::error::{ErrorKind, GenSearchError};
use crate::generate::PromptResponder;
use crate::rag::{RetrievalChain, NOT_INITIALIZED};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Everything the handlers need, built once at startup.
pub struct AppState {
    pub responder: PromptResponder,
    /// `None` when startup ingestion or chain setup failed.
    pub rag: Option<RetrievalChain>,
}

/// Build the router with permissive CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, build_router(Arc::new(state))).await?;
    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct PromptRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Serialize)]
struct GeneratedResponse {
    generated: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    simple_llm_ready: bool,
    rag_ready: bool,
}

/// Unreadable or non-JSON bodies are treated like a missing prompt.
fn read_prompt(body: &[u8]) -> String {
    serde_json::from_slice::<PromptRequest>(body)
        .ok()
        .and_then(|req| req.prompt)
        .unwrap_or_default()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for GenSearchError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Input => StatusCode::BAD_REQUEST,
            ErrorKind::Config | ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        error_response(status, self.to_string())
    }
}

fn generated(text: String) -> Response {
    Json(GeneratedResponse { generated: text }).into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        simple_llm_ready: state.responder.is_ready(),
        rag_ready: state.rag.is_some(),
    })
}

async fn generate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let prompt = read_prompt(&body);
    match state.responder.generate(&prompt).await {
        Ok(text) => generated(text),
        Err(e) => e.into_response(),
    }
}

async fn ask(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Some(rag) = state.rag.as_ref() else {
        return GenSearchError::NotInitialized(NOT_INITIALIZED.to_string()).into_response();
    };

    let prompt = read_prompt(&body);
    match rag.ask(&prompt).await {
        Ok(answer) => generated(answer),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Prompts, Settings, NOT_FOUND_ANSWER};
    use crate::document::DocumentChunk;
    use crate::embedding::mock::MockEmbedder;
    use crate::embedding::Embedder;
    use crate::generate::{LLM_UNAVAILABLE, MISSING_PROMPT};
    use crate::ingest::VectorStoreHandle;
    use crate::llm::mock::MockChatModel;
    use crate::llm::ChatModel;
    use crate::rag::NO_PROMPT;
    use crate::vector_store::{ChunkRecord, MemoryVectorStore, VectorStore};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const PARIS: &str = "The capital of France is Paris, a city known for its culture, history, and iconic landmarks such as the Eiffel Tower.";

    async fn rag_chain(model: &MockChatModel) -> RetrievalChain {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = Arc::new(MockEmbedder::new(16));
        store.recreate_collection("electoral_list_rag", 16).await.unwrap();

        let text = "Serial 41 voter Asha Rao ward 9";
        let chunk = DocumentChunk {
            source: "138.pdf".to_string(),
            content: text.to_string(),
            chunk_index: 0,
        };
        let record = ChunkRecord::new(chunk, embedder.embed(text).await.unwrap());
        store.upsert("electoral_list_rag", &[record]).await.unwrap();

        let handle = VectorStoreHandle::new(store, embedder, "electoral_list_rag");
        RetrievalChain::setup(
            Some(handle),
            Some(Arc::new(model.clone())),
            &Settings::default(),
            &Prompts::default(),
        )
        .unwrap()
    }

    fn app(model: Option<&MockChatModel>, rag: Option<RetrievalChain>) -> Router {
        let model = model.map(|m| Arc::new(m.clone()) as Arc<dyn ChatModel>);
        let responder = PromptResponder::new(model, &Settings::default(), &Prompts::default());
        build_router(Arc::new(AppState { responder, rag }))
    }

    fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn prompt(text: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({ "prompt": text })).unwrap()
    }

    async fn json_of(resp: Response) -> serde_json::Value {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let mock = MockChatModel::replying("x");
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app(Some(&mock), None).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            json_of(resp).await,
            serde_json::json!({"status": "ok", "simple_llm_ready": true, "rag_ready": false})
        );

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app(None, None).oneshot(req).await.unwrap();
        assert_eq!(json_of(resp).await["simple_llm_ready"], false);
    }

    #[tokio::test]
    async fn test_health_with_rag_ready() {
        let mock = MockChatModel::replying("x");
        let rag = rag_chain(&mock).await;
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app(Some(&mock), Some(rag)).oneshot(req).await.unwrap();
        assert_eq!(json_of(resp).await["rag_ready"], true);
    }

    #[tokio::test]
    async fn test_generate_truncates_to_twenty_words() {
        let mock = MockChatModel::replying(PARIS);
        let resp = app(Some(&mock), None)
            .oneshot(post_json("/generate", prompt("What is the capital of France?")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let json = json_of(resp).await;
        let text = json["generated"].as_str().unwrap();
        assert_eq!(text.split_whitespace().count(), 20);
        assert!(text.ends_with("landmarks such as"));
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_prompt() {
        let mock = MockChatModel::replying("unused");
        for body in [
            b"{}".to_vec(),
            prompt(""),
            prompt("   "),
            b"not json".to_vec(),
            br#"{"prompt": 42}"#.to_vec(),
        ] {
            let resp = app(Some(&mock), None)
                .oneshot(post_json("/generate", body))
                .await
                .unwrap();
            assert_eq!(resp.status(), 400);
            assert_eq!(json_of(resp).await["error"], MISSING_PROMPT);
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_without_client_is_500() {
        let resp = app(None, None)
            .oneshot(post_json("/generate", prompt("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        assert_eq!(json_of(resp).await["error"], LLM_UNAVAILABLE);

        // input is checked first
        let resp = app(None, None)
            .oneshot(post_json("/generate", b"{}".to_vec()))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_generate_provider_failure_is_500() {
        let mock = MockChatModel::failing();
        let resp = app(Some(&mock), None)
            .oneshot(post_json("/generate", prompt("hello")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let json = json_of(resp).await;
        assert!(json["error"].as_str().unwrap().contains("mock LLM error"));
    }

    #[tokio::test]
    async fn test_ask_without_rag_is_not_initialized() {
        let mock = MockChatModel::replying("unused");
        for body in [prompt("Who is serial 41?"), b"{}".to_vec()] {
            let resp = app(Some(&mock), None)
                .oneshot(post_json("/ask", body))
                .await
                .unwrap();
            assert_eq!(resp.status(), 500);
            assert_eq!(json_of(resp).await["error"], NOT_INITIALIZED);
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_prompt() {
        let mock = MockChatModel::replying("unused");
        let rag = rag_chain(&mock).await;
        let resp = app(Some(&mock), Some(rag))
            .oneshot(post_json("/ask", prompt(" ")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(json_of(resp).await["error"], NO_PROMPT);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_answers_from_document() {
        let mock = MockChatModel::replying("Asha Rao, ward 9.");
        let rag = rag_chain(&mock).await;
        let resp = app(Some(&mock), Some(rag))
            .oneshot(post_json("/ask", prompt("Who is serial 41?")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(json_of(resp).await["generated"], "Asha Rao, ward 9.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][0].content.contains("Serial 41 voter Asha Rao ward 9"));
    }

    #[tokio::test]
    async fn test_ask_unanswerable_returns_fallback() {
        let mock = MockChatModel::replying(NOT_FOUND_ANSWER);
        let rag = rag_chain(&mock).await;
        let resp = app(Some(&mock), Some(rag))
            .oneshot(post_json("/ask", prompt("What is the boiling point of mercury?")))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(json_of(resp).await["generated"], NOT_FOUND_ANSWER);
    }
}
