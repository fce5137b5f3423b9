//! Capability bundles
//!
//! Each resource kind's jobs reach the outside world only through one of
//! these traits. The `Remote*` implementations adapt the control-plane
//! repositories, the container engine and the telemetry service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use keel_core::conversion::{Conversion, Convert, convert_all};
use keel_core::domain::build::{Build, BuildRecord};
use keel_core::domain::git_provider::GitProviderConfig;
use keel_core::domain::target::Target;
use keel_core::domain::workspace::Workspace;
use keel_core::dto::env::to_map;
use keel_core::dto::workspace::UpdateProviderMetadataDto;
use keel_core::env::merge_env_vars;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::podman::ContainerEngine;
use crate::repository::RemoteApi;
use crate::telemetry::{BuildRunnerEvent, RunnerEvent, ServerEvent, TelemetryService};

#[async_trait]
pub trait WorkspaceJobCapabilities: Send + Sync {
    async fn find_workspace(&self, workspace_id: &str) -> Result<Workspace>;

    async fn find_target(&self, target_id: &str) -> Result<Target>;

    async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &str,
    ) -> Result<()>;

    async fn find_git_provider_config(&self, id: &str) -> Result<GitProviderConfig>;

    /// Global variables merged with the workspace's own; the workspace wins
    async fn workspace_environment_variables(
        &self,
        workspace: &Workspace,
    ) -> Result<HashMap<String, String>>;

    fn track_event(&self, event: ServerEvent, props: Value) -> Result<()>;
}

#[async_trait]
pub trait TargetJobCapabilities: Send + Sync {
    async fn find_target(&self, target_id: &str) -> Result<Target>;

    async fn handle_successful_creation(&self, target_id: &str) -> Result<()>;

    async fn update_target_provider_metadata(&self, target_id: &str, metadata: &str)
    -> Result<()>;

    fn track_event(&self, event: ServerEvent, props: Value) -> Result<()>;
}

#[async_trait]
pub trait BuildJobCapabilities: Send + Sync {
    async fn find_build(&self, build_id: &str) -> Result<BuildRecord>;

    /// Successful builds of the repository at `repo_url`
    async fn list_successful_builds(&self, repo_url: &str) -> Result<Vec<Build>>;

    /// Git provider configs applicable to `repo_url`
    async fn list_configs_for_url(&self, repo_url: &str) -> Result<Vec<GitProviderConfig>>;

    async fn check_image_exists(&self, image: &str) -> bool;

    async fn delete_image(&self, image: &str, force: bool) -> Result<()>;

    fn track_event(&self, event: BuildRunnerEvent, props: Value) -> Result<()>;
}

pub trait RunnerJobCapabilities: Send + Sync {
    fn track_event(&self, event: RunnerEvent, props: Value) -> Result<()>;
}

/// Percent-encodes a repository URL for use as a path segment
pub(crate) fn escape_repo_url(repo_url: &str) -> String {
    url::form_urlencoded::byte_serialize(repo_url.as_bytes()).collect()
}

fn require<T>(conversion: Conversion<T>, kind: &str, id: &str) -> Result<T> {
    conversion
        .into_option()
        .ok_or_else(|| anyhow::anyhow!("{} {} not found", kind, id))
}

async fn fetch_target<A: RemoteApi>(api: &A, target_id: &str) -> Result<Target> {
    let dto = api
        .get_target(target_id)
        .await
        .with_context(|| format!("Failed to fetch target {}", target_id))?;
    require(dto.convert()?, "target", target_id)
}

/// Workspace capabilities backed by the control-plane API
pub struct RemoteWorkspaceCapabilities<A> {
    api: Arc<A>,
    telemetry: Arc<dyn TelemetryService>,
    client_id: String,
}

impl<A: RemoteApi> RemoteWorkspaceCapabilities<A> {
    pub fn new(api: Arc<A>, telemetry: Arc<dyn TelemetryService>, client_id: String) -> Self {
        Self {
            api,
            telemetry,
            client_id,
        }
    }
}

#[async_trait]
impl<A: RemoteApi> WorkspaceJobCapabilities for RemoteWorkspaceCapabilities<A> {
    async fn find_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let dto = self
            .api
            .get_workspace(workspace_id)
            .await
            .with_context(|| format!("Failed to fetch workspace {}", workspace_id))?;
        require(dto.convert()?, "workspace", workspace_id)
    }

    async fn find_target(&self, target_id: &str) -> Result<Target> {
        fetch_target(self.api.as_ref(), target_id).await
    }

    async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &str,
    ) -> Result<()> {
        self.api
            .update_workspace_provider_metadata(
                workspace_id,
                &UpdateProviderMetadataDto {
                    metadata: metadata.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    async fn find_git_provider_config(&self, id: &str) -> Result<GitProviderConfig> {
        let dto = self
            .api
            .get_git_provider(id)
            .await
            .with_context(|| format!("Failed to fetch git provider {}", id))?;
        require(dto.convert()?, "git provider", id)
    }

    async fn workspace_environment_variables(
        &self,
        workspace: &Workspace,
    ) -> Result<HashMap<String, String>> {
        let global = self
            .api
            .list_environment_variables()
            .await
            .context("Failed to fetch environment variables")?;
        Ok(merge_env_vars(&to_map(&global), &workspace.env_vars))
    }

    fn track_event(&self, event: ServerEvent, props: Value) -> Result<()> {
        self.telemetry
            .track_server_event(event, &self.client_id, props)
    }
}

/// Target capabilities backed by the control-plane API
pub struct RemoteTargetCapabilities<A> {
    api: Arc<A>,
    telemetry: Arc<dyn TelemetryService>,
    client_id: String,
}

impl<A: RemoteApi> RemoteTargetCapabilities<A> {
    pub fn new(api: Arc<A>, telemetry: Arc<dyn TelemetryService>, client_id: String) -> Self {
        Self {
            api,
            telemetry,
            client_id,
        }
    }
}

#[async_trait]
impl<A: RemoteApi> TargetJobCapabilities for RemoteTargetCapabilities<A> {
    async fn find_target(&self, target_id: &str) -> Result<Target> {
        fetch_target(self.api.as_ref(), target_id).await
    }

    async fn handle_successful_creation(&self, target_id: &str) -> Result<()> {
        self.api.handle_successful_creation(target_id).await?;
        Ok(())
    }

    async fn update_target_provider_metadata(
        &self,
        target_id: &str,
        metadata: &str,
    ) -> Result<()> {
        self.api
            .update_target_provider_metadata(
                target_id,
                &UpdateProviderMetadataDto {
                    metadata: metadata.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    fn track_event(&self, event: ServerEvent, props: Value) -> Result<()> {
        self.telemetry
            .track_server_event(event, &self.client_id, props)
    }
}

/// Build capabilities backed by the control-plane API and a container engine
pub struct RemoteBuildCapabilities<A> {
    api: Arc<A>,
    engine: Arc<dyn ContainerEngine>,
    telemetry: Arc<dyn TelemetryService>,
    client_id: String,
}

impl<A: RemoteApi> RemoteBuildCapabilities<A> {
    pub fn new(
        api: Arc<A>,
        engine: Arc<dyn ContainerEngine>,
        telemetry: Arc<dyn TelemetryService>,
        client_id: String,
    ) -> Self {
        Self {
            api,
            engine,
            telemetry,
            client_id,
        }
    }
}

#[async_trait]
impl<A: RemoteApi> BuildJobCapabilities for RemoteBuildCapabilities<A> {
    async fn find_build(&self, build_id: &str) -> Result<BuildRecord> {
        let dto = self
            .api
            .get_build(build_id)
            .await
            .with_context(|| format!("Failed to fetch build {}", build_id))?;
        require(dto.convert()?, "build", build_id)
    }

    async fn list_successful_builds(&self, repo_url: &str) -> Result<Vec<Build>> {
        let dtos = self
            .api
            .list_successful_builds(&escape_repo_url(repo_url))
            .await?;
        let records: Vec<BuildRecord> = convert_all(&dtos)?;
        Ok(records.into_iter().map(|record| record.build).collect())
    }

    async fn list_configs_for_url(&self, repo_url: &str) -> Result<Vec<GitProviderConfig>> {
        let dtos = self
            .api
            .list_git_providers_for_url(&escape_repo_url(repo_url))
            .await?;
        Ok(convert_all(&dtos)?)
    }

    async fn check_image_exists(&self, image: &str) -> bool {
        self.engine.image_exists(image).await
    }

    async fn delete_image(&self, image: &str, force: bool) -> Result<()> {
        self.engine.delete_image(image, force).await
    }

    fn track_event(&self, event: BuildRunnerEvent, props: Value) -> Result<()> {
        self.telemetry
            .track_build_runner_event(event, &self.client_id, props)
    }
}

/// Runner capabilities backed by the telemetry service
pub struct RemoteRunnerCapabilities {
    telemetry: Arc<dyn TelemetryService>,
    client_id: String,
}

impl RemoteRunnerCapabilities {
    pub fn new(telemetry: Arc<dyn TelemetryService>, client_id: String) -> Self {
        Self {
            telemetry,
            client_id,
        }
    }
}

impl RunnerJobCapabilities for RemoteRunnerCapabilities {
    fn track_event(&self, event: RunnerEvent, props: Value) -> Result<()> {
        self.telemetry
            .track_runner_event(event, &self.client_id, props)
    }
}
