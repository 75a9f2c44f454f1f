pub mod health;
pub mod query;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let server = &state.config.config.server;
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route_service("/", ServeFile::new(server.static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/upload", post(upload::upload_document))
        .route("/query", post(query::query_handler))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(middleware::from_fn(request_logger))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::create_router;
    use crate::api::state::{Adapters, AppState};
    use crate::domain::ports::VectorStore;
    use crate::infrastructure::{AppConfig, DocumentTextExtractor, InMemoryVectorStore};
    use crate::testing::{FailingVectorStore, StubEmbedding, StubLlm, StubTranscriber};

    const BOUNDARY: &str = "X-RAG-TEST-BOUNDARY";
    const DIM: usize = 16;

    struct TestApp {
        router: Router,
        store: Arc<InMemoryVectorStore>,
    }

    fn app_with(llm: StubLlm, transcriber: StubTranscriber) -> TestApp {
        let store = Arc::new(InMemoryVectorStore::new(DIM));
        let mut config = AppConfig::default();
        config.config.chunking.chunk_size = 8;
        config.config.chunking.overlap = 2;

        let adapters = Adapters {
            extractor: Arc::new(DocumentTextExtractor::new()),
            embedding: Arc::new(StubEmbedding::new(DIM)),
            vector_store: store.clone(),
            llm: Arc::new(llm),
            transcriber: Arc::new(transcriber),
        };
        let state = AppState::new(config, adapters).unwrap();

        TestApp {
            router: create_router(state),
            store,
        }
    }

    fn app() -> TestApp {
        app_with(StubLlm::replying("42"), StubTranscriber::returning("what is it"))
    }

    fn multipart_body(name: &str, filename: Option<&str>, data: &[u8]) -> Body {
        let disposition = match filename {
            Some(f) => format!("form-data; name=\"{name}\"; filename=\"{f}\""),
            None => format!("form-data; name=\"{name}\""),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn multipart_request(uri: &str, body: Body) -> Request<Body> {
        Request::post(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    fn json_request(uri: &str, json: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(
            &app.router,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_store() {
        let adapters = Adapters {
            extractor: Arc::new(DocumentTextExtractor::new()),
            embedding: Arc::new(StubEmbedding::new(DIM)),
            vector_store: Arc::new(FailingVectorStore),
            llm: Arc::new(StubLlm::replying("x")),
            transcriber: Arc::new(StubTranscriber::returning("x")),
        };
        let router = create_router(AppState::new(AppConfig::default(), adapters).unwrap());

        let request = Request::get("/ready").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["vector_store"], "disconnected");
    }

    #[tokio::test]
    async fn test_upload_file_is_embedded() {
        let app = app();
        let text = b"one two three four five six seven eight nine ten eleven twelve";

        let (status, body) = send(
            &app.router,
            multipart_request("/upload", multipart_body("file", Some("notes.txt"), text)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Document successfully uploaded and embedded!");
        assert_eq!(body["chunks"], 2);
        assert_eq!(app.store.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_empty_file_succeeds() {
        let app = app();

        let (status, body) = send(
            &app.router,
            multipart_request("/upload", multipart_body("file", Some("empty.txt"), b"")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"], 0);
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_file_or_url_is_bad_request() {
        let app = app();

        let (status, body) = send(
            &app.router,
            multipart_request("/upload", multipart_body("other", None, b"x")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file or URL provided");

        let (status, _) = send(&app.router, json_request("/upload", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_server_error() {
        let app = app();

        let (status, body) = send(
            &app.router,
            multipart_request("/upload", multipart_body("file", Some("x.pdf"), b"nope")),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_query_text_answers() {
        let app = app();
        send(
            &app.router,
            multipart_request(
                "/upload",
                multipart_body("file", Some("a.txt"), b"the answer is forty two"),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            json_request("/query", r#"{"text": "what is the answer?"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "42");
    }

    #[tokio::test]
    async fn test_query_empty_index_returns_not_found_message() {
        let app = app();

        let request = json_request("/query", r#"{"text": "hello"}"#);
        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Sorry, I couldn't find relevant info for: hello");
    }

    #[tokio::test]
    async fn test_query_with_unreachable_llm_still_has_answer() {
        let app = app_with(StubLlm::failing(), StubTranscriber::returning("x"));
        app.store
            .upsert(&[crate::domain::VectorRecord::new(
                crate::domain::Chunk::new("context text"),
                crate::domain::Embedding::new(vec![1.0; DIM]),
            )])
            .await
            .unwrap();

        let (status, body) = send(&app.router, json_request("/query", r#"{"text": "q"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let answer = body["answer"].as_str().unwrap();
        assert!(answer.contains("Your question: q"));
        assert!(answer.contains("context text"));
    }

    #[tokio::test]
    async fn test_query_blank_text_is_bad_request() {
        let app = app();

        let (status, body) = send(&app.router, json_request("/query", r#"{"text": "   "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Empty text received");

        let (status, _) = send(&app.router, json_request("/query", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_without_input_is_bad_request() {
        let app = app();

        let request = Request::post("/query")
            .header("content-type", "text/plain")
            .body(Body::from("hi"))
            .unwrap();
        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No text or audio provided");
    }

    #[tokio::test]
    async fn test_query_malformed_json_is_bad_request() {
        let app = app();
        let (status, _) = send(&app.router, json_request("/query", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_audio_with_empty_transcript_fails() {
        let app = app_with(StubLlm::replying("x"), StubTranscriber::returning(""));

        let (status, body) = send(
            &app.router,
            multipart_request("/query", multipart_body("audio", Some("q.webm"), b"\x1a\x45")),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to transcribe audio");
    }

    #[tokio::test]
    async fn test_query_audio_is_answered() {
        let app = app_with(
            StubLlm::replying("spoken answer"),
            StubTranscriber::returning("what is it"),
        );
        send(
            &app.router,
            multipart_request("/upload", multipart_body("file", Some("a.txt"), b"it is a test")),
        )
        .await;

        let (status, body) = send(
            &app.router,
            multipart_request("/query", multipart_body("audio", Some("q.webm"), b"\x1a\x45")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "spoken answer");
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>RAG</h1>").unwrap();

        let mut config = AppConfig::default();
        config.config.server.static_dir = dir.path().to_path_buf();
        let adapters = Adapters {
            extractor: Arc::new(DocumentTextExtractor::new()),
            embedding: Arc::new(StubEmbedding::new(DIM)),
            vector_store: Arc::new(InMemoryVectorStore::new(DIM)),
            llm: Arc::new(StubLlm::replying("x")),
            transcriber: Arc::new(StubTranscriber::returning("x")),
        };
        let router = create_router(AppState::new(config, adapters).unwrap());

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>RAG</h1>");
    }
}
