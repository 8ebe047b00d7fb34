//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, ScriptedExecutor};
use sage_core::status::JobStatus;
use sage_core::types::JobId;
use sage_db::models::job::Job;
use sage_db::{InMemoryJobStore, JobStore, StoreError};
use tower::ServiceExt;

fn app() -> axum::Router {
    common::build_test_app(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(ScriptedExecutor::ok("x")),
    )
    .0
}

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let response = get(app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["jobs_in_flight"], 0);
}

// ---------------------------------------------------------------------------
// Test: an unreachable store reports degraded, still 200
// ---------------------------------------------------------------------------

struct DownStore;

#[async_trait::async_trait]
impl JobStore for DownStore {
    async fn create(&self, _id: JobId, _question: &str) -> Result<Job, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn read(&self, _id: JobId) -> Result<Job, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn update(&self, _id: JobId, _s: JobStatus, _r: &str) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn health_check_reports_degraded_store() {
    let (app, _state) =
        common::build_test_app(Arc::new(DownStore), Arc::new(ScriptedExecutor::ok("x")));

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}

// ---------------------------------------------------------------------------
// Test: store outages surface as sanitized 500 / database error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_outage_on_submit_is_sanitized_500() {
    let (app, _state) =
        common::build_test_app(Arc::new(DownStore), Arc::new(ScriptedExecutor::ok("x")));

    let response = common::post_json(app, "/query", r#"{"question": "hello"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn store_outage_on_status_is_database_error_event() {
    let (app, _state) =
        common::build_test_app(Arc::new(DownStore), Arc::new(ScriptedExecutor::ok("x")));

    let id = sage_core::types::new_job_id();
    let body = common::body_text(get(app, &format!("/status?job_id={id}")).await).await;

    assert_eq!(
        common::parse_sse(&body),
        vec![common::SseEvent {
            event: "error".into(),
            data: "database error".into()
        }]
    );
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(app(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let response = get(app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS allows any origin, including preflight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/query")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");

    let allow_methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(
            allow_methods.contains(method),
            "Allow-Methods should contain {method}, got: {allow_methods}"
        );
    }
    let allow_headers = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allow_headers.contains("content-type"), "got: {allow_headers}");
}

#[tokio::test]
async fn simple_requests_carry_cors_header() {
    let request = Request::builder()
        .uri("/health")
        .header("Origin", "https://example.org")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
