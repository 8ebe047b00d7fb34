//! Handler for the job status event stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures::stream::BoxStream;
use futures::StreamExt;
use sage_core::types::JobId;
use serde::Deserialize;

use crate::engine::notifier::{self, StatusEvent};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub job_id: Option<String>,
}

/// GET /status?job_id=...
///
/// Server-sent events: `processing` while the job is pending, then one
/// `completed` or `error` event, then the server closes the stream.
pub async fn job_status(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> AppResult<Sse<BoxStream<'static, Result<Event, Infallible>>>> {
    let raw_id = params
        .job_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Job ID is required".into()))?;

    tracing::debug!(job_id = %raw_id, "Status stream opened");

    let events: BoxStream<'static, StatusEvent> = match raw_id.parse::<JobId>() {
        Ok(job_id) => notifier::subscribe(
            Arc::clone(&state.store),
            job_id,
            state.config.status_poll_interval,
        )
        .boxed(),
        Err(_) => notifier::not_found().boxed(),
    };

    let stream = events
        .take_until(state.shutdown.clone().cancelled_owned())
        .map(|event| Ok(event.into_sse()))
        .boxed();

    Ok(Sse::new(stream))
}
