//! Runner jobs
//!
//! Provider management on the runner itself. Providers are registered with
//! the provider manager when the runner starts; install and update jobs only
//! succeed for a provider that is already registered at the requested
//! version, while uninstall removes it from the manager.

use anyhow::{Context, Result};
use async_trait::async_trait;
use keel_core::domain::job::{Job, JobAction};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ExecutableJob, JobFactory, RunnerJobCapabilities, unsupported};
use crate::provider::ProviderManager;
use crate::telemetry::RunnerEvent;

/// Provider named by a runner job's metadata
#[derive(Debug, Deserialize)]
struct ProviderJobMetadata {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

pub struct RunnerJobFactory {
    capabilities: Arc<dyn RunnerJobCapabilities>,
    provider_manager: Arc<ProviderManager>,
}

impl RunnerJobFactory {
    pub fn new(
        capabilities: Arc<dyn RunnerJobCapabilities>,
        provider_manager: Arc<ProviderManager>,
    ) -> Self {
        Self {
            capabilities,
            provider_manager,
        }
    }
}

impl JobFactory for RunnerJobFactory {
    fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
        Box::new(RunnerJob {
            job,
            capabilities: Arc::clone(&self.capabilities),
            provider_manager: Arc::clone(&self.provider_manager),
        })
    }
}

struct RunnerJob {
    job: Job,
    capabilities: Arc<dyn RunnerJobCapabilities>,
    provider_manager: Arc<ProviderManager>,
}

impl RunnerJob {
    fn metadata(&self) -> Result<ProviderJobMetadata> {
        let raw = self
            .job
            .metadata
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("job {} has no provider metadata", self.job.id))?;
        serde_json::from_str(raw)
            .with_context(|| format!("Invalid provider metadata for job {}", self.job.id))
    }

    /// Succeeds when the provider is registered at the requested version
    async fn ensure_registered(&self, metadata: &ProviderJobMetadata) -> Result<()> {
        let Some(provider) = self.provider_manager.get_provider(&metadata.name).await else {
            anyhow::bail!("provider {} is not available on this runner", metadata.name);
        };

        let installed = provider.info().version;
        match &metadata.version {
            Some(requested) if *requested != installed => anyhow::bail!(
                "provider {} is at {}, cannot switch to {}",
                metadata.name,
                installed,
                requested
            ),
            _ => {
                info!("Provider {} {} is registered", metadata.name, installed);
                Ok(())
            }
        }
    }

    async fn run(&self) -> Result<RunnerEvent> {
        let metadata = self.metadata()?;

        match self.job.action {
            JobAction::InstallProvider => {
                self.ensure_registered(&metadata).await?;
                Ok(RunnerEvent::ProviderInstalled)
            }
            JobAction::UpdateProvider => {
                self.ensure_registered(&metadata).await?;
                Ok(RunnerEvent::ProviderUpdated)
            }
            JobAction::UninstallProvider => {
                if self
                    .provider_manager
                    .unregister(&metadata.name)
                    .await
                    .is_none()
                {
                    anyhow::bail!("provider {} is not installed", metadata.name);
                }
                Ok(RunnerEvent::ProviderUninstalled)
            }
            _ => Err(unsupported(&self.job)),
        }
    }
}

#[async_trait]
impl ExecutableJob for RunnerJob {
    fn job(&self) -> &Job {
        &self.job
    }

    async fn execute(&self) -> Result<()> {
        info!("Executing runner job {} ({})", self.job.id, self.job.action);

        let result = self.run().await;

        let (event, props) = match &result {
            Ok(event) => (*event, json!({ "metadata": self.job.metadata })),
            Err(e) => (
                RunnerEvent::ProviderJobFailed,
                json!({
                    "action": self.job.action.to_string(),
                    "error": format!("{:#}", e),
                }),
            ),
        };
        if let Err(e) = self.capabilities.track_event(event, props) {
            warn!("Failed to track telemetry event: {:#}", e);
        }

        result.map(|_| ())
    }
}
