//! Job dispatch bridge
//!
//! Connects the runner's polling loop to the control-plane job queue:
//! - Listing the jobs assigned to this runner
//! - Reporting job state transitions
//! - Pushing liveness and capacity metadata
//!
//! Every operation is a single remote round trip. The bridge keeps no state
//! between calls and never retries; the polling loop owns retry policy.

use anyhow::Result;
use async_trait::async_trait;
use keel_client::ClientError;
use keel_core::conversion::convert_all;
use keel_core::domain::job::{Job, JobState};
use keel_core::domain::runner::RunnerMetadata;
use keel_core::dto::job::{JobDto, UpdateJobStateDto};
use keel_core::dto::runner::SetRunnerMetadataDto;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::repository::{JobRepository, RunnerRepository};

/// Job listing failed
///
/// Renders exactly like the underlying client error.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct JobListError {
    /// HTTP status of the failed response, `-1` if none was received
    pub status_code: i32,
    #[source]
    pub source: ClientError,
}

impl From<ClientError> for JobListError {
    fn from(source: ClientError) -> Self {
        let status_code = source.status().map(i32::from).unwrap_or(-1);
        Self {
            status_code,
            source,
        }
    }
}

/// The job queue as seen by the polling loop
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Fetches a fresh snapshot of the jobs assigned to this runner
    ///
    /// Returns the jobs in the order the control plane sent them, together
    /// with the HTTP status of the response.
    async fn list_pending_jobs(&self) -> std::result::Result<(Vec<Job>, u16), JobListError>;

    /// Reports a job state, with the rendered error message if the job failed
    async fn update_job_state(
        &self,
        job_id: &str,
        state: JobState,
        job_error: Option<&anyhow::Error>,
    ) -> Result<()>;

    /// Pushes runner uptime, providers and running job count
    async fn set_runner_metadata(&self, runner_id: &str, metadata: &RunnerMetadata) -> Result<()>;
}

/// Job queue backed by the control-plane API
pub struct RemoteJobBridge<A> {
    api: Arc<A>,
    runner_id: String,
}

impl<A> RemoteJobBridge<A>
where
    A: JobRepository + RunnerRepository,
{
    /// Creates a bridge scoped to `runner_id`
    pub fn new(api: Arc<A>, runner_id: impl Into<String>) -> Self {
        Self {
            api,
            runner_id: runner_id.into(),
        }
    }
}

/// Copies a wire job into the domain model field by field
fn job_from_dto(dto: JobDto) -> Job {
    Job {
        id: dto.id,
        resource_id: dto.resource_id,
        runner_id: dto.runner_id,
        resource_type: dto.resource_type.into(),
        state: dto.state.into(),
        action: dto.action.into(),
        metadata: dto.metadata,
        error: dto.error,
    }
}

#[async_trait]
impl<A> JobQueue for RemoteJobBridge<A>
where
    A: JobRepository + RunnerRepository,
{
    async fn list_pending_jobs(&self) -> std::result::Result<(Vec<Job>, u16), JobListError> {
        let (jobs, status) = self.api.list_runner_jobs(&self.runner_id).await?;

        debug!("Listed {} job(s) (status {})", jobs.len(), status);

        Ok((jobs.into_iter().map(job_from_dto).collect(), status))
    }

    async fn update_job_state(
        &self,
        job_id: &str,
        state: JobState,
        job_error: Option<&anyhow::Error>,
    ) -> Result<()> {
        let update = UpdateJobStateDto {
            state: state.into(),
            error_message: job_error.map(|e| format!("{:#}", e)),
        };

        self.api
            .update_job_state(&self.runner_id, job_id, &update)
            .await?;

        Ok(())
    }

    async fn set_runner_metadata(&self, runner_id: &str, metadata: &RunnerMetadata) -> Result<()> {
        let providers = convert_all(&metadata.providers)?;

        let dto = SetRunnerMetadataDto {
            uptime: metadata.uptime,
            providers,
            running_jobs: metadata.running_jobs,
        };

        self.api.set_runner_metadata(runner_id, &dto).await?;

        Ok(())
    }
}
