//! Submission gateway: accept a question, persist it, start its job.

use sage_core::types::{new_job_id, JobId};
use sage_db::{JobStore, StoreError};

use super::JobEngine;
use crate::error::{AppError, AppResult};

/// Create a `pending` job for `question` and start its lifecycle task.
///
/// Returns as soon as the row is persisted and the task is spawned; the
/// job's outcome is observed through the store, never through this call.
pub async fn submit(store: &dyn JobStore, engine: &JobEngine, question: String) -> AppResult<JobId> {
    let job_id = new_job_id();

    match store.create(job_id, &question).await {
        Ok(_) => {}
        Err(StoreError::DuplicateKey(id)) => {
            return Err(AppError::InternalError(format!(
                "generated job id {id} already exists"
            )));
        }
        Err(e) => return Err(AppError::Store(e)),
    }

    tracing::info!(%job_id, question_len = question.len(), "Job submitted");

    // The handle is the completion signal; submission does not wait on it.
    drop(engine.spawn(job_id, question));

    Ok(job_id)
}
