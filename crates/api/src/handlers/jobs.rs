//! Handlers for job submission and lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use sage_core::error::CoreError;
use sage_core::types::JobId;
use sage_db::models::job::Job;
use sage_db::StoreError;
use serde::{Deserialize, Serialize};

use crate::engine::submission;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct SubmitQuestion {
    pub question: String,
}

/// Response of `POST /query`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

/// POST /query
///
/// Accept a question and return its job id without waiting for the answer.
/// A body that is not JSON, or lacks a string `question`, is a 400.
pub async fn submit_query(
    State(state): State<AppState>,
    payload: Result<Json<SubmitQuestion>, JsonRejection>,
) -> AppResult<Json<SubmitResponse>> {
    let Json(input) = payload.map_err(|rejection| {
        let detail = rejection.body_text();
        tracing::warn!(error = %detail, "Rejected submission payload");
        AppError::BadRequest(format!("Invalid request payload: {detail}"))
    })?;

    let job_id = submission::submit(state.store.as_ref(), &state.engine, input.question).await?;

    Ok(Json(SubmitResponse { job_id }))
}

/// GET /jobs/{id}
///
/// Return the stored row for a job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Job>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: raw_id.clone(),
        })
    };

    let job_id: JobId = raw_id.parse().map_err(|_| not_found())?;

    match state.store.read(job_id).await {
        Ok(job) => Ok(Json(job)),
        Err(StoreError::NotFound(_)) => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}
