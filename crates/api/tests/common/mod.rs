use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use postmap_api::config::ServerConfig;
use postmap_api::router::build_app_router;
use postmap_api::state::AppState;
use postmap_events::EventBus;
use postmap_store::{DocumentStore, MemoryStore};

/// Uid granted admin rights in [`test_config`].
pub const ADMIN_UID: &str = "admin-uid";
/// Ordinary signed-in uid used by most tests.
pub const USER_UID: &str = "uid-1";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_uids: vec![ADMIN_UID.to_string()],
        store_batch_limit: 400,
    }
}

/// Build the full application router over an in-memory store, with all
/// middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses. The store is returned alongside
/// so tests can assert on raw document state.
pub fn build_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        store: Arc::clone(&store) as Arc<dyn DocumentStore>,
        config: Arc::new(test_config()),
        bus: Arc::new(EventBus::default()),
    };

    (build_app_router(state, &test_config()), store)
}

/// Issue a GET carrying the standard identity headers.
pub async fn auth_get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(USER_UID), None).await
}

/// Issue an unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a request with identity headers and an optional JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    uid: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(uid) = uid {
        builder = builder
            .header("x-user-uid", uid)
            .header("x-user-name", "Tester");
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Issue a request with identity headers and a plain-text body.
pub async fn send_text(
    app: Router,
    method: Method,
    uri: &str,
    uid: Option<&str>,
    body: String,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(uid) = uid {
        builder = builder
            .header("x-user-uid", uid)
            .header("x-user-name", "Tester");
    }
    let request = builder
        .header("content-type", "text/csv")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert the standard `{ "error": ..., "code": ... }` error envelope.
pub async fn assert_error_code(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
    assert!(json["error"].is_string());
}
