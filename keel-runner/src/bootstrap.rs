//! Runner bootstrap
//!
//! Wires the control-plane API into everything the polling loop needs: the
//! provider manager, the job queue bridge and one job factory per resource
//! type. Apart from the environment variable fetch of the registry resolver,
//! nothing here talks to the network.

use anyhow::{Context, Result};
use keel_core::domain::server::ServerConfig;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::bridge::{JobQueue, RemoteJobBridge};
use crate::builder::{BuilderFactory, BuilderFactoryConfig, ImageBuilder};
use crate::config::Config;
use crate::jobs::{
    BuildJobFactory, JobFactories, RemoteBuildCapabilities, RemoteRunnerCapabilities,
    RemoteTargetCapabilities, RemoteWorkspaceCapabilities, RunnerJobFactory, TargetJobFactory,
    WorkspaceJobFactory,
};
use crate::logs::LoggerFactory;
use crate::podman::ContainerEngine;
use crate::provider::{ProviderManager, ProviderManagerConfig, RemoteProviderManagerApi};
use crate::registry;
use crate::repository::{LogRepository, RemoteApi};
use crate::telemetry::TelemetryService;

/// Where provider-created resources fetch the agent install script
pub fn binary_url(server_api_url: &str) -> Result<String> {
    let mut url = Url::parse(server_api_url)
        .with_context(|| format!("Invalid server API URL: {}", server_api_url))?;

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("server API URL cannot be a base: {}", server_api_url))?
        .pop_if_empty()
        .extend(["binary", "script"]);

    Ok(url.to_string())
}

/// Creates the runner's provider manager
pub fn init_remote_provider_manager<A>(
    api: Arc<A>,
    server_config: &ServerConfig,
    config: &Config,
) -> Result<Arc<ProviderManager>>
where
    A: RemoteApi,
{
    let manager_config = ProviderManagerConfig {
        logs_dir: config.target_logs_dir(),
        api_url: server_config.tunnel_api_url(),
        api_key: config.server_api_key.clone(),
        runner_id: config.id.clone(),
        runner_name: config.name.clone(),
        download_url: binary_url(&config.server_api_url)?,
        server_url: server_config.headscale_url(),
        base_dir: config.providers_dir.clone(),
        server_port: server_config.headscale_port,
        api_port: server_config.api_port,
    };

    info!(
        "Provider manager configured (providers in {})",
        manager_config.base_dir.display()
    );

    Ok(Arc::new(ProviderManager::new(
        manager_config,
        Arc::new(RemoteProviderManagerApi::new(api)),
    )))
}

/// Inputs for [`remote_runner`]
pub struct RemoteRunnerParams<A> {
    pub api: Arc<A>,
    pub server_config: ServerConfig,
    pub config: Config,
    pub provider_manager: Arc<ProviderManager>,
    pub container_engine: Arc<dyn ContainerEngine>,
    pub image_builder: Option<Arc<dyn ImageBuilder>>,
    pub telemetry: Arc<dyn TelemetryService>,
}

/// A runner wired to the control plane, ready to poll
pub struct RemoteRunner {
    pub config: Config,
    pub registry_url: String,
    pub provider_manager: Arc<ProviderManager>,
    pub queue: Arc<dyn JobQueue>,
    pub factories: JobFactories,
}

/// Assembles the job queue bridge and the job factories
pub async fn remote_runner<A>(params: RemoteRunnerParams<A>) -> Result<RemoteRunner>
where
    A: RemoteApi,
{
    let RemoteRunnerParams {
        api,
        server_config,
        config,
        provider_manager,
        container_engine,
        image_builder,
        telemetry,
    } = params;

    let target_logs_dir = config.target_logs_dir();
    let build_logs_dir = config.build_logs_dir();
    for dir in [&target_logs_dir, &build_logs_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create logs directory {}", dir.display()))?;
    }
    let logger_factory = Arc::new(
        LoggerFactory::new(Some(target_logs_dir), Some(build_logs_dir))
            .with_remote(Arc::clone(&api) as Arc<dyn LogRepository>),
    );

    let workspace = WorkspaceJobFactory::new(
        Arc::new(RemoteWorkspaceCapabilities::new(
            Arc::clone(&api),
            Arc::clone(&telemetry),
            config.id.clone(),
        )),
        Arc::clone(&logger_factory),
        Arc::clone(&provider_manager),
        server_config.builder_image.clone(),
    );

    let target = TargetJobFactory::new(
        Arc::new(RemoteTargetCapabilities::new(
            Arc::clone(&api),
            Arc::clone(&telemetry),
            config.id.clone(),
        )),
        Arc::clone(&logger_factory),
        Arc::clone(&provider_manager),
    );

    let registries = registry::resolve(api.as_ref(), &server_config).await;
    let builder_factory = BuilderFactory::new(
        BuilderFactoryConfig {
            image: server_config.builder_image.clone(),
            container_registries: registries.container_registries,
            build_image_container_registry: registries.builder_registry,
            build_image_namespace: registries.image_namespace,
            default_workspace_image: server_config.default_workspace_image.clone(),
            default_workspace_user: server_config.default_workspace_user.clone(),
        },
        image_builder,
    );
    let build = BuildJobFactory::new(
        Arc::new(RemoteBuildCapabilities::new(
            Arc::clone(&api),
            container_engine,
            Arc::clone(&telemetry),
            config.id.clone(),
        )),
        Arc::clone(&logger_factory),
        Arc::new(builder_factory),
        config.builds_dir(),
    );

    let runner = RunnerJobFactory::new(
        Arc::new(RemoteRunnerCapabilities::new(telemetry, config.id.clone())),
        Arc::clone(&provider_manager),
    );

    let queue = Arc::new(RemoteJobBridge::new(api, config.id.clone()));

    Ok(RemoteRunner {
        registry_url: server_config.registry_url,
        config,
        provider_manager,
        queue,
        factories: JobFactories {
            workspace: Arc::new(workspace),
            target: Arc::new(target),
            build: Arc::new(build),
            runner: Arc::new(runner),
        },
    })
}
