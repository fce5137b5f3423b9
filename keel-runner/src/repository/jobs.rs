//! Jobs repository
//!
//! Handles communication with the control plane for the runner job queue:
//! - Listing jobs assigned to this runner
//! - Reporting job state transitions

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::job::{JobDto, UpdateJobStateDto};

/// Repository trait for job-queue operations
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Lists the jobs assigned to a runner
    ///
    /// Returns the job records together with the HTTP status of the response.
    async fn list_runner_jobs(&self, runner_id: &str) -> Result<(Vec<JobDto>, u16)>;

    /// Reports a job state transition
    async fn update_job_state(
        &self,
        runner_id: &str,
        job_id: &str,
        update: &UpdateJobStateDto,
    ) -> Result<()>;
}

#[async_trait]
impl JobRepository for ApiClient {
    async fn list_runner_jobs(&self, runner_id: &str) -> Result<(Vec<JobDto>, u16)> {
        ApiClient::list_runner_jobs(self, runner_id).await
    }

    async fn update_job_state(
        &self,
        runner_id: &str,
        job_id: &str,
        update: &UpdateJobStateDto,
    ) -> Result<()> {
        ApiClient::update_job_state(self, runner_id, job_id, update).await
    }
}
