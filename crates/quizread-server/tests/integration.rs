use std::sync::Arc;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use quizread_core::extract::PlainTextExtractor;
use quizread_core::llm::QuizModel;
use quizread_core::object_store::{LocalObjectStore, ObjectStore};
use quizread_core::Store;
use quizread_server::state::{AppState, Services};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct StubModel;

impl QuizModel for StubModel {
    fn generate(&self, _prompt: &str) -> Result<String, String> {
        Ok(r#"{"question": "Q?", "answers": ["a", "b", "c", "d"], "correctIndex": 1}"#.to_string())
    }
}

fn test_app(dir: &TempDir) -> axum::Router {
    let store = Store::in_memory().unwrap();
    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        dir.path().to_path_buf(),
        "http://localhost:8000".to_string(),
        b"test-secret",
    ));
    let extractor = Arc::new(PlainTextExtractor::new(objects.clone()));
    let services = Services {
        objects,
        model: Arc::new(StubModel),
        extractor,
    };
    quizread_server::build_router(AppState::new(store, services).unwrap())
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// POST with no body at all.
async fn post_empty(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Synced action routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timer_lifecycle_over_http() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post_json(
        app.clone(),
        "/api/FocusTimer/start",
        json!({"durationMs": 1500, "phase": "reading"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let timer_id = body["timerId"].as_str().expect("timerId in response").to_string();

    let (status, body) = post_json(
        app.clone(),
        "/api/FocusTimer/pause",
        json!({"timerId": timer_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    // Pausing again is a domain error, still HTTP 200.
    let (status, body) = post_json(
        app,
        "/api/FocusTimer/pause",
        json!({"timerId": timer_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Timer is not active"}));
}

#[tokio::test]
async fn optional_fields_may_be_omitted_from_the_body() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // prepareUpload without contentType defaults to PDF.
    let (status, body) = post_json(
        app,
        "/api/Library/prepareUpload",
        json!({"ownerId": "u1", "fileName": "book.pdf"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["signedUrl"].as_str().unwrap().contains("sig="));
    assert!(body["publicUrl"].is_string());
    assert!(body["fileName"].as_str().unwrap().ends_with("book.pdf"));
}

// ---------------------------------------------------------------------------
// Passthrough routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_and_login_stay_on_the_passthrough() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post_json(
        app.clone(),
        "/api/UserAuth/register",
        json!({"email": "ada@example.com", "passwordHash": "h4sh"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["userId"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        app.clone(),
        "/api/UserAuth/login",
        json!({"email": "ada@example.com", "passwordHash": "h4sh"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], json!(user_id));

    // Domain errors come back as 200 {error} here too.
    let (status, body) = post_json(
        app,
        "/api/UserAuth/register",
        json!({"email": "not-an-email", "passwordHash": "h4sh"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Invalid email format"}));
}

#[tokio::test]
async fn synced_queries_match_passthrough_shapes() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = post_json(
        app.clone(),
        "/api/UserAuth/register",
        json!({"email": "ada@example.com", "passwordHash": "h4sh"}),
    )
    .await;
    let user_id = body["userId"].as_str().unwrap().to_string();

    // Entity-or-null queries return the document directly.
    let (status, body) = post_json(
        app.clone(),
        "/api/UserAuth/_getUserByEmail",
        json!({"email": "ada@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], json!(user_id));
    assert_eq!(body["email"], json!("ada@example.com"));

    // ... and null when nothing matches.
    let (status, body) = post_json(
        app.clone(),
        "/api/UserAuth/_getUser",
        json!({"userId": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    // Array queries return the bare array.
    let (status, body) = post_empty(app, "/api/FocusTimer/_getActiveTimers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ---------------------------------------------------------------------------
// Route policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_routes_are_404() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post_json(app, "/api/Library/defenestrate", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn a_faulting_request_does_not_disturb_a_concurrent_one() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // No sync matches a start request missing its phase, so that request
    // faults with a 500 while the well-formed one lands normally.
    let bad = post_json(
        app.clone(),
        "/api/FocusTimer/start",
        json!({"durationMs": 1500}),
    );
    let good = post_json(
        app.clone(),
        "/api/FocusTimer/start",
        json!({"durationMs": 1500, "phase": "reading"}),
    );
    let ((bad_status, bad_body), (good_status, good_body)) = tokio::join!(bad, good);

    assert_eq!(bad_status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(bad_body["error"].is_string());
    assert_eq!(good_status, StatusCode::OK);
    assert!(good_body["timerId"].is_string());

    // Exactly one timer was ever started.
    let (_, body) = post_empty(app, "/api/FocusTimer/_getActiveTimers").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn consecutive_requests_do_not_interfere() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, first) = post_json(
        app.clone(),
        "/api/FocusTimer/start",
        json!({"durationMs": 1500, "phase": "reading"}),
    )
    .await;
    let (_, second) = post_json(
        app.clone(),
        "/api/FocusTimer/start",
        json!({"durationMs": 300, "phase": "break"}),
    )
    .await;
    assert_ne!(first["timerId"], second["timerId"]);

    let (status, body) = post_json(app, "/api/FocusTimer/_getTimersByPhase", json!({"phase": "break"})).await;
    assert_eq!(status, StatusCode::OK);
    let timers = body.as_array().unwrap();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0]["_id"], second["timerId"]);
}
