//! Status notifier: job state as a finite stream of events.
//!
//! Each subscription polls the store on its own fixed interval until it
//! sees a terminal status or a read error, emits exactly one terminal
//! event, and ends. Subscriptions share nothing but the store.
//!
//! The stream does its polling lazily as it is consumed. When the HTTP
//! body is dropped (client disconnect) the polling stops with it.

use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use futures::stream::{self, Stream};
use sage_core::status::JobStatus;
use sage_core::types::JobId;
use sage_db::{JobStore, StoreError};
use serde::Serialize;
use tokio::time::{Interval, MissedTickBehavior};

pub const PROCESSING_MESSAGE: &str = "job is still being processed";
pub const JOB_NOT_FOUND: &str = "job not found";
pub const DATABASE_ERROR: &str = "database error";
/// Sent as the result of a terminal job whose result is missing.
pub const NO_RESULT: &str = "no result available";

/// One observation of a job, as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The job is still `pending`.
    Processing,
    /// The job is terminal (`completed` or `failed`).
    Completed { status: JobStatus, result: String },
    /// The job cannot be reported; `message` is client-facing text.
    Error { message: &'static str },
}

#[derive(Serialize)]
struct CompletedPayload<'a> {
    status: JobStatus,
    result: &'a str,
}

impl StatusEvent {
    pub fn not_found() -> Self {
        Self::Error {
            message: JOB_NOT_FOUND,
        }
    }

    /// Everything except `Processing` ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    /// SSE data line.
    pub fn data(&self) -> String {
        match self {
            Self::Processing => PROCESSING_MESSAGE.to_string(),
            Self::Completed { status, result } => serde_json::to_string(&CompletedPayload {
                status: *status,
                result,
            })
            .unwrap_or_else(|_| DATABASE_ERROR.to_string()),
            Self::Error { message } => (*message).to_string(),
        }
    }

    pub fn into_sse(self) -> Event {
        Event::default().event(self.name()).data(self.data())
    }
}

/// Map one store read to the event it produces.
pub async fn observe(store: &dyn JobStore, job_id: JobId) -> StatusEvent {
    match store.read(job_id).await {
        Ok(job) if job.status.is_terminal() => StatusEvent::Completed {
            status: job.status,
            result: job.result.unwrap_or_else(|| {
                tracing::warn!(%job_id, "Terminal job has no result");
                NO_RESULT.to_string()
            }),
        },
        Ok(_) => StatusEvent::Processing,
        Err(StoreError::NotFound(_)) => {
            tracing::debug!(%job_id, "Status requested for unknown job");
            StatusEvent::not_found()
        }
        Err(e) => {
            tracing::error!(%job_id, error = %e, "Status poll failed");
            StatusEvent::Error {
                message: DATABASE_ERROR,
            }
        }
    }
}

struct Subscription {
    store: Arc<dyn JobStore>,
    ticker: Option<Interval>,
    finished: bool,
}

/// Poll `job_id` every `interval` until it is terminal.
///
/// The first read happens immediately. Yields zero or more `Processing`
/// events followed by exactly one terminal event.
pub fn subscribe(
    store: Arc<dyn JobStore>,
    job_id: JobId,
    interval: Duration,
) -> impl Stream<Item = StatusEvent> + Send + 'static {
    let initial = Subscription {
        store,
        ticker: None,
        finished: false,
    };

    stream::unfold(initial, move |mut sub| async move {
        if sub.finished {
            return None;
        }

        let ticker = sub.ticker.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;

        let event = observe(sub.store.as_ref(), job_id).await;
        sub.finished = event.is_terminal();
        Some((event, sub))
    })
}

/// Stream for an identifier that cannot exist.
pub fn not_found() -> impl Stream<Item = StatusEvent> + Send + 'static {
    stream::once(async { StatusEvent::not_found() })
}
