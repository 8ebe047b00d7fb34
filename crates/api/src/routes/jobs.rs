use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{jobs, status};
use crate::state::AppState;

/// Job routes, mounted at the root.
///
/// ```text
/// POST   /query       -> submit_query
/// GET    /status      -> job_status (event stream)
/// GET    /jobs/{id}   -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(jobs::submit_query))
        .route("/status", get(status::job_status))
        .route("/jobs/{id}", get(jobs::get_job))
}
