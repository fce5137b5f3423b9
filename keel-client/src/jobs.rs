//! Runner job endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::job::{JobDto, UpdateJobStateDto, parse_job_listing};
use serde_json::Value;
use tracing::warn;

impl ApiClient {
    // =============================================================================
    // Job Queue
    // =============================================================================

    /// List the jobs assigned to a runner
    ///
    /// Records that cannot be parsed are logged and left out; only a body
    /// that is not a JSON array fails the call.
    ///
    /// # Returns
    /// The job records together with the HTTP status of the response
    pub async fn list_runner_jobs(&self, runner_id: &str) -> Result<(Vec<JobDto>, u16)> {
        let response = self
            .get(&format!("/runner/{}/jobs", segment(runner_id)))
            .send()
            .await?;

        let (records, status): (Vec<Value>, u16) =
            self.handle_response_with_status(response).await?;
        let (jobs, rejected) = parse_job_listing(records);

        for job in rejected {
            warn!(
                "Skipping unreadable job {}: {}",
                job.id.as_deref().unwrap_or("<no id>"),
                job.reason
            );
        }

        Ok((jobs, status))
    }

    /// Report a job state transition
    ///
    /// # Arguments
    /// * `runner_id` - The runner the job belongs to
    /// * `job_id` - The job being updated
    /// * `update` - New state and optional error message
    pub async fn update_job_state(
        &self,
        runner_id: &str,
        job_id: &str,
        update: &UpdateJobStateDto,
    ) -> Result<()> {
        let response = self
            .post(&format!(
                "/runner/{}/jobs/{}/state",
                segment(runner_id),
                segment(job_id)
            ))
            .json(update)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
