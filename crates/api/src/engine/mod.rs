//! Job lifecycle engine.
//!
//! Every accepted job gets exactly one background task, spawned by the
//! submission gateway. The task runs the executor once and writes the
//! terminal status and result. After row creation that task is the only
//! writer of the row, so no locking beyond the store's single-row atomic
//! write is needed.
//!
//! [`submission`] creates jobs and [`notifier`] streams their status.

pub mod notifier;
pub mod submission;

use std::sync::Arc;
use std::time::Duration;

use sage_core::executor::Executor;
use sage_core::status::JobStatus;
use sage_core::types::JobId;
use sage_db::JobStore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// How a lifecycle task ended.
///
/// Returned through the task's [`JoinHandle`]; it is the completion signal
/// of [`JobEngine::spawn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Output persisted with status `completed`.
    Completed,
    /// Diagnostic persisted with status `failed`.
    Failed,
    /// The terminal write failed. The row is still `pending` and will stay
    /// that way; there is no retry.
    Unpersisted { status: JobStatus, error: String },
}

/// Runs jobs against the executor and records their terminal state.
pub struct JobEngine {
    store: Arc<dyn JobStore>,
    executor: Arc<dyn Executor>,
    tracker: TaskTracker,
}

impl JobEngine {
    pub fn new(store: Arc<dyn JobStore>, executor: Arc<dyn Executor>) -> Self {
        Self {
            store,
            executor,
            tracker: TaskTracker::new(),
        }
    }

    /// Start the lifecycle task for a job already persisted as `pending`.
    ///
    /// Must be called once per job. The task is detached from the caller;
    /// dropping the handle does not cancel it.
    pub fn spawn(&self, job_id: JobId, question: String) -> JoinHandle<JobOutcome> {
        let store = Arc::clone(&self.store);
        let executor = Arc::clone(&self.executor);
        self.tracker
            .spawn(async move { run_job(store, executor, job_id, question).await })
    }

    /// Number of lifecycle tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for running jobs to reach a terminal state.
    ///
    /// Returns `false` if `timeout` elapsed with jobs still running.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok()
    }
}

/// Execute one job and persist its terminal state.
async fn run_job(
    store: Arc<dyn JobStore>,
    executor: Arc<dyn Executor>,
    job_id: JobId,
    question: String,
) -> JobOutcome {
    tracing::info!(%job_id, "Processing job");

    // Own task so a panicking executor becomes a failed job, not a lost one.
    let execution = tokio::spawn(async move { executor.run(&question).await });

    let (status, result) = match execution.await {
        Ok(Ok(output)) => (JobStatus::Completed, output.trim().to_string()),
        Ok(Err(e)) => {
            tracing::warn!(%job_id, error = %e, "Job execution failed");
            (JobStatus::Failed, format!("Error: {e}"))
        }
        Err(e) => {
            tracing::error!(%job_id, error = %e, "Job execution task aborted");
            (JobStatus::Failed, format!("Error: execution aborted: {e}"))
        }
    };

    debug_assert!(JobStatus::Pending.can_transition_to(status));

    match store.update(job_id, status, &result).await {
        Ok(()) => {
            tracing::info!(%job_id, %status, "Job reached terminal status");
            match status {
                JobStatus::Completed => JobOutcome::Completed,
                _ => JobOutcome::Failed,
            }
        }
        Err(e) => {
            tracing::error!(
                %job_id,
                %status,
                error = %e,
                "Failed to persist terminal status; job remains pending",
            );
            JobOutcome::Unpersisted {
                status,
                error: e.to_string(),
            }
        }
    }
}
