//! Repository for the `jobs` table.
//!
//! Status values are written via `JobStatus::as_str`; no literal status
//! strings appear in the queries.

use sage_core::status::JobStatus;
use sage_core::types::JobId;
use sqlx::PgPool;

use crate::models::job::{Job, JobRow};
use crate::store::{JobStore, StoreError};

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, question, status, result, created_at";

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Query operations for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new pending job.
    pub async fn insert(pool: &PgPool, id: JobId, question: &str) -> Result<JobRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (id, question, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .bind(question)
            .bind(JobStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by id.
    pub async fn find_by_id(pool: &PgPool, id: JobId) -> Result<Option<JobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite status and result. Returns `false` when no row matched.
    pub async fn set_status(
        pool: &PgPool,
        id: JobId,
        status: JobStatus,
        result: &str,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query("UPDATE jobs SET status = $2, result = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(result)
            .execute(pool)
            .await?;
        Ok(outcome.rows_affected() > 0)
    }
}

/// [`JobStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}

#[async_trait::async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, id: JobId, question: &str) -> Result<Job, StoreError> {
        match JobRepo::insert(&self.pool, id, question).await {
            Ok(row) => row.try_into(),
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(job_id = %id, "Job id already exists");
                Err(StoreError::DuplicateKey(id))
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn read(&self, id: JobId) -> Result<Job, StoreError> {
        JobRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(id))?
            .try_into()
            .inspect_err(|e: &StoreError| {
                if let StoreError::Corrupt { status, .. } = e {
                    tracing::error!(job_id = %id, %status, "Stored job has unrecognised status");
                }
            })
    }

    async fn update(&self, id: JobId, status: JobStatus, result: &str) -> Result<(), StoreError> {
        if JobRepo::set_status(&self.pool, id, status, result).await? {
            Ok(())
        } else {
            tracing::warn!(job_id = %id, %status, "Terminal update matched no job");
            Err(StoreError::NotFound(id))
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
