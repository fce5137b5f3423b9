//! Workspace jobs

use anyhow::{Context, Result};
use async_trait::async_trait;
use keel_core::domain::job::{Job, JobAction};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ExecutableJob, JobFactory, WorkspaceJobCapabilities, unsupported};
use crate::logs::{JobLogger, LoggerFactory};
use crate::provider::{ProviderManager, ProviderRequest};
use crate::telemetry::ServerEvent;

pub struct WorkspaceJobFactory {
    capabilities: Arc<dyn WorkspaceJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    provider_manager: Arc<ProviderManager>,
    builder_image: String,
}

impl WorkspaceJobFactory {
    pub fn new(
        capabilities: Arc<dyn WorkspaceJobCapabilities>,
        logger_factory: Arc<LoggerFactory>,
        provider_manager: Arc<ProviderManager>,
        builder_image: String,
    ) -> Self {
        Self {
            capabilities,
            logger_factory,
            provider_manager,
            builder_image,
        }
    }
}

impl JobFactory for WorkspaceJobFactory {
    fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
        Box::new(WorkspaceJob {
            job,
            capabilities: Arc::clone(&self.capabilities),
            logger_factory: Arc::clone(&self.logger_factory),
            provider_manager: Arc::clone(&self.provider_manager),
            builder_image: self.builder_image.clone(),
        })
    }
}

struct WorkspaceJob {
    job: Job,
    capabilities: Arc<dyn WorkspaceJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    provider_manager: Arc<ProviderManager>,
    builder_image: String,
}

fn success_event(action: JobAction) -> Option<ServerEvent> {
    match action {
        JobAction::Create => Some(ServerEvent::WorkspaceCreated),
        JobAction::Start => Some(ServerEvent::WorkspaceStarted),
        JobAction::Stop => Some(ServerEvent::WorkspaceStopped),
        JobAction::Restart => Some(ServerEvent::WorkspaceRestarted),
        JobAction::Delete | JobAction::ForceDelete => Some(ServerEvent::WorkspaceDestroyed),
        _ => None,
    }
}

impl WorkspaceJob {
    async fn run(&self, logger: &JobLogger) -> Result<()> {
        let workspace = self.capabilities.find_workspace(&self.job.resource_id).await?;
        let target = self.capabilities.find_target(&workspace.target_id).await?;
        let env_vars = self
            .capabilities
            .workspace_environment_variables(&workspace)
            .await?;

        let git_provider_config = match &workspace.git_provider_config_id {
            Some(id) if !id.is_empty() => {
                Some(self.capabilities.find_git_provider_config(id).await?)
            }
            _ => None,
        };

        let provider_name = target.target_config.provider_info.name.clone();
        let provider = self
            .provider_manager
            .get_provider(&provider_name)
            .await
            .ok_or_else(|| anyhow::anyhow!("provider {} is not installed", provider_name))?;

        logger.info(format!(
            "Running {} for workspace {} on target {}",
            self.job.action, workspace.name, target.name
        ));

        let workspace_id = workspace.id.clone();
        let response = provider
            .handle(ProviderRequest::Workspace {
                action: self.job.action,
                workspace,
                target,
                env_vars,
                git_provider_config,
                builder_image: self.builder_image.clone(),
            })
            .await
            .with_context(|| format!("Provider {} failed", provider_name))?;

        if let Some(metadata) = response.metadata {
            self.capabilities
                .update_workspace_provider_metadata(&workspace_id, &metadata)
                .await?;
        }

        logger.info(format!("Workspace {} {} done", workspace_id, self.job.action));
        Ok(())
    }
}

#[async_trait]
impl ExecutableJob for WorkspaceJob {
    fn job(&self) -> &Job {
        &self.job
    }

    async fn execute(&self) -> Result<()> {
        let Some(event) = success_event(self.job.action) else {
            return Err(unsupported(&self.job));
        };

        info!(
            "Executing workspace job {} ({} {})",
            self.job.id, self.job.action, self.job.resource_id
        );

        let logger = self.logger_factory.workspace_logger(&self.job.resource_id);
        let result = self.run(&logger).await;
        if let Err(e) = &result {
            logger.error(format!("{:#}", e));
        }
        logger.close().await;

        let (event, props) = match &result {
            Ok(()) => (event, json!({ "workspace_id": self.job.resource_id })),
            Err(e) => (
                ServerEvent::WorkspaceJobFailed,
                json!({
                    "workspace_id": self.job.resource_id,
                    "action": self.job.action.to_string(),
                    "error": format!("{:#}", e),
                }),
            ),
        };
        if let Err(e) = self.capabilities.track_event(event, props) {
            warn!("Failed to track telemetry event: {:#}", e);
        }

        result
    }
}
