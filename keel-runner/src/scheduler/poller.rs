//! Job poller
//!
//! Polls the job queue for pending jobs and executes them.
//! Each job runs in its own task; a semaphore caps how many run at once.

use keel_core::domain::job::{Job, JobState};
use keel_core::domain::runner::RunnerMetadata;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::bootstrap::RemoteRunner;
use crate::bridge::{JobListError, JobQueue};
use crate::config::Config;
use crate::jobs::JobFactories;
use crate::provider::ProviderManager;

/// Job poller that continuously polls for and executes jobs
pub struct JobPoller {
    config: Config,
    registry_url: String,
    queue: Arc<dyn JobQueue>,
    factories: JobFactories,
    provider_manager: Arc<ProviderManager>,
    semaphore: Arc<Semaphore>,
    started_at: Instant,
}

impl JobPoller {
    /// Creates a poller for a bootstrapped runner
    pub fn new(runner: RemoteRunner) -> Self {
        let semaphore = Arc::new(Semaphore::new(runner.config.max_parallel_jobs));
        Self {
            config: runner.config,
            registry_url: runner.registry_url,
            queue: runner.queue,
            factories: runner.factories,
            provider_manager: runner.provider_manager,
            semaphore,
            started_at: Instant::now(),
        }
    }

    /// Starts the polling loop
    pub async fn run(self: Arc<Self>) {
        info!(
            "Starting job poller (interval: {:?}, registry: {})",
            self.config.poll_interval, self.registry_url
        );

        let _metadata_handle = Arc::clone(&self).start_metadata_loop();

        let mut interval = time::interval(self.config.poll_interval);

        loop {
            interval.tick().await;

            debug!("Polling for pending jobs");

            match self.poll_once().await {
                Ok(handles) => {
                    if !handles.is_empty() {
                        info!("Started {} job(s) this cycle", handles.len());
                    }
                }
                Err(e) => {
                    error!("Failed to list jobs (status {}): {}", e.status_code, e);
                }
            }
        }
    }

    /// Performs a single poll cycle, returning the spawned job tasks
    pub async fn poll_once(&self) -> Result<Vec<JoinHandle<()>>, JobListError> {
        let (jobs, _) = self.queue.list_pending_jobs().await?;

        let mut handles = Vec::new();

        for job in jobs {
            if job.state != JobState::Pending {
                continue;
            }

            // Try to acquire semaphore permit, skip if at max capacity
            let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() else {
                debug!("Max parallel jobs reached, skipping job {} for now", job.id);
                continue;
            };

            // Claim before spawning so the next poll does not see it pending
            if let Err(e) = self
                .queue
                .update_job_state(&job.id, JobState::Running, None)
                .await
            {
                warn!("Failed to mark job {} as running: {:#}", job.id, e);
                continue;
            }

            handles.push(self.spawn_job_task(job, permit));
        }

        Ok(handles)
    }

    /// Spawns a task to execute a single job
    fn spawn_job_task(&self, job: Job, permit: OwnedSemaphorePermit) -> JoinHandle<()> {
        let queue = Arc::clone(&self.queue);
        let executable = self.factories.create(job);

        tokio::spawn(async move {
            // Held until the task ends
            let _permit = permit;
            let job_id = executable.job().id.clone();
            info!("Starting execution of job {}", job_id);

            let result = executable.execute().await;

            let report = match &result {
                Ok(()) => {
                    info!("Job {} succeeded", job_id);
                    queue.update_job_state(&job_id, JobState::Success, None).await
                }
                Err(e) => {
                    error!("Job {} failed: {:#}", job_id, e);
                    queue.update_job_state(&job_id, JobState::Error, Some(e)).await
                }
            };
            if let Err(e) = report {
                warn!("Failed to report state of job {}: {:#}", job_id, e);
            }
        })
    }

    /// Current liveness and capacity
    pub async fn metadata(&self) -> RunnerMetadata {
        let running_jobs = self.config.max_parallel_jobs - self.semaphore.available_permits();
        RunnerMetadata {
            uptime: self.started_at.elapsed().as_secs(),
            providers: self.provider_manager.providers_info().await,
            running_jobs: Some(running_jobs as u64),
        }
    }

    /// Pushes runner metadata once
    pub async fn push_metadata(&self) -> anyhow::Result<()> {
        let metadata = self.metadata().await;
        self.queue
            .set_runner_metadata(&self.config.id, &metadata)
            .await
    }

    /// Starts a background task pushing runner metadata
    fn start_metadata_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.config.metadata_interval);

            loop {
                ticker.tick().await;

                debug!("Pushing runner metadata");

                if let Err(e) = self.push_metadata().await {
                    warn!("Failed to set runner metadata: {:#}", e);
                }
            }
        })
    }
}
