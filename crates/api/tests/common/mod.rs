#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sage_api::config::{ExecutorConfig, ServerConfig, StoreBackend};
use sage_api::router::build_app_router;
use sage_api::state::AppState;
use sage_core::executor::{ExecutionError, Executor};
use sage_core::status::JobStatus;
use sage_core::types::JobId;
use sage_db::JobStore;
use tokio::sync::Notify;
use tower::ServiceExt;

/// Poll interval used by status streams under test.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Build a test `ServerConfig` with an in-memory store and a fast poll.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        status_poll_interval: TEST_POLL_INTERVAL,
        executor: ExecutorConfig {
            program: "cat".to_string(),
            args: vec![],
            working_directory: None,
        },
    }
}

/// Build the full application router around the given store and executor.
///
/// Uses the same `build_app_router` as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(store: Arc<dyn JobStore>, executor: Arc<dyn Executor>) -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(store, executor, config.clone());
    (build_app_router(state.clone(), &config), state)
}

/// Returns a fixed answer, optionally only after `gate` is notified.
pub struct ScriptedExecutor {
    output: Result<String, (i32, String)>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedExecutor {
    pub fn ok(output: &str) -> Self {
        Self {
            output: Ok(output.to_string()),
            gate: None,
        }
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            output: Err((exit_code, stderr.to_string())),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait::async_trait]
impl Executor for ScriptedExecutor {
    async fn run(&self, _input: &str) -> Result<String, ExecutionError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.output
            .clone()
            .map_err(|(exit_code, stderr)| ExecutionError::Failed { exit_code, stderr })
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One parsed server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Split an SSE body into events (blank-line separated `event:`/`data:` fields).
pub fn parse_sse(body: &str) -> Vec<SseEvent> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = String::new();
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = value.trim_start().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                }
            }
            SseEvent {
                event,
                data: data.join("\n"),
            }
        })
        .collect()
}

/// Submit `question` and return the assigned job id.
pub async fn submit(app: Router, question: &str) -> JobId {
    let body = serde_json::json!({ "question": question }).to_string();
    let response = post_json(app, "/query", &body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["job_id"].as_str().unwrap().parse().unwrap()
}

/// Wait until the job leaves `pending`, failing the test after 5 seconds.
pub async fn wait_for_terminal(store: &dyn JobStore, id: JobId) -> sage_db::models::job::Job {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let job = store.read(id).await.unwrap();
            if job.status != JobStatus::Pending {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job did not reach a terminal status")
}
