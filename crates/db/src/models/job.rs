//! Job entity model.

use std::str::FromStr;

use sage_core::status::JobStatus;
use sage_core::types::{JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::store::StoreError;

/// One job as stored.
///
/// `result` is `None` exactly while `status` is `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub question: String,
    pub status: JobStatus,
    pub result: Option<String>,
    pub created_at: Timestamp,
}

/// A raw row from the `jobs` table, status still as text.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: JobId,
    pub question: String,
    pub status: String,
    pub result: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_str(&row.status).map_err(|_| StoreError::Corrupt {
            id: row.id,
            status: row.status.clone(),
        })?;
        Ok(Job {
            id: row.id,
            question: row.question,
            status,
            result: row.result,
            created_at: row.created_at,
        })
    }
}
