//! Target jobs

use anyhow::{Context, Result};
use async_trait::async_trait;
use keel_core::domain::job::{Job, JobAction};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ExecutableJob, JobFactory, TargetJobCapabilities, unsupported};
use crate::logs::{JobLogger, LoggerFactory};
use crate::provider::{ProviderManager, ProviderRequest};
use crate::telemetry::ServerEvent;

pub struct TargetJobFactory {
    capabilities: Arc<dyn TargetJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    provider_manager: Arc<ProviderManager>,
}

impl TargetJobFactory {
    pub fn new(
        capabilities: Arc<dyn TargetJobCapabilities>,
        logger_factory: Arc<LoggerFactory>,
        provider_manager: Arc<ProviderManager>,
    ) -> Self {
        Self {
            capabilities,
            logger_factory,
            provider_manager,
        }
    }
}

impl JobFactory for TargetJobFactory {
    fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
        Box::new(TargetJob {
            job,
            capabilities: Arc::clone(&self.capabilities),
            logger_factory: Arc::clone(&self.logger_factory),
            provider_manager: Arc::clone(&self.provider_manager),
        })
    }
}

struct TargetJob {
    job: Job,
    capabilities: Arc<dyn TargetJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    provider_manager: Arc<ProviderManager>,
}

fn success_event(action: JobAction) -> Option<ServerEvent> {
    match action {
        JobAction::Create => Some(ServerEvent::TargetCreated),
        JobAction::Start => Some(ServerEvent::TargetStarted),
        JobAction::Stop => Some(ServerEvent::TargetStopped),
        JobAction::Restart => Some(ServerEvent::TargetRestarted),
        JobAction::Delete | JobAction::ForceDelete => Some(ServerEvent::TargetDestroyed),
        _ => None,
    }
}

impl TargetJob {
    async fn run(&self, logger: &JobLogger) -> Result<()> {
        let target = self.capabilities.find_target(&self.job.resource_id).await?;

        let provider_name = target.target_config.provider_info.name.clone();
        let provider = self
            .provider_manager
            .get_provider(&provider_name)
            .await
            .ok_or_else(|| anyhow::anyhow!("provider {} is not installed", provider_name))?;

        logger.info(format!("Running {} for target {}", self.job.action, target.name));

        let target_id = target.id.clone();
        let response = provider
            .handle(ProviderRequest::Target {
                action: self.job.action,
                target,
            })
            .await
            .with_context(|| format!("Provider {} failed", provider_name))?;

        if self.job.action == JobAction::Create {
            self.capabilities
                .handle_successful_creation(&target_id)
                .await?;
        }

        if let Some(metadata) = response.metadata {
            self.capabilities
                .update_target_provider_metadata(&target_id, &metadata)
                .await?;
        }

        logger.info(format!("Target {} {} done", target_id, self.job.action));
        Ok(())
    }
}

#[async_trait]
impl ExecutableJob for TargetJob {
    fn job(&self) -> &Job {
        &self.job
    }

    async fn execute(&self) -> Result<()> {
        let Some(event) = success_event(self.job.action) else {
            return Err(unsupported(&self.job));
        };

        info!(
            "Executing target job {} ({} {})",
            self.job.id, self.job.action, self.job.resource_id
        );

        let logger = self.logger_factory.target_logger(&self.job.resource_id);
        let result = self.run(&logger).await;
        if let Err(e) = &result {
            logger.error(format!("{:#}", e));
        }
        logger.close().await;

        let (event, props) = match &result {
            Ok(()) => (event, json!({ "target_id": self.job.resource_id })),
            Err(e) => (
                ServerEvent::TargetJobFailed,
                json!({
                    "target_id": self.job.resource_id,
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
