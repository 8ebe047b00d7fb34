//! The Job Store contract.

use sage_core::status::JobStatus;
use sage_core::types::JobId;

use crate::models::job::Job;

/// Failures reported by a [`JobStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateKey(JobId),

    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {id} has unrecognised status '{status}'")]
    Corrupt { id: JobId, status: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable, single-row atomic storage of jobs.
///
/// Every read reflects the latest committed write. The store does not check
/// status transitions: after creation the lifecycle engine is the only
/// writer of a row and is responsible for moving it forward exactly once.
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new `pending` row with no result.
    async fn create(&self, id: JobId, question: &str) -> Result<Job, StoreError>;

    /// Fetch the full row for `id`.
    async fn read(&self, id: JobId) -> Result<Job, StoreError>;

    /// Overwrite status and result of an existing row.
    async fn update(&self, id: JobId, status: JobStatus, result: &str) -> Result<(), StoreError>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}
