//! In-process [`JobStore`] backed by a `HashMap`.
//!
//! Holds the same contract as the Postgres store minus durability across
//! restarts. Used by tests and for running the service without a database.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::Utc;
use sage_core::status::JobStatus;
use sage_core::types::JobId;
use tokio::sync::RwLock;

use crate::models::job::Job;
use crate::store::{JobStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, id: JobId, question: &str) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.entry(id) {
            Entry::Occupied(_) => {
                tracing::warn!(job_id = %id, "Job id already exists");
                Err(StoreError::DuplicateKey(id))
            }
            Entry::Vacant(slot) => {
                let job = Job {
                    id,
                    question: question.to_string(),
                    status: JobStatus::Pending,
                    result: None,
                    created_at: Utc::now(),
                };
                slot.insert(job.clone());
                Ok(job)
            }
        }
    }

    async fn read(&self, id: JobId) -> Result<Job, StoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: JobId, status: JobStatus, result: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            tracing::warn!(job_id = %id, %status, "Terminal update matched no job");
            return Err(StoreError::NotFound(id));
        };
        job.status = status;
        job.result = Some(result.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
