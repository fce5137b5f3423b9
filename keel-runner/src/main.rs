//! Keel Runner
//!
//! An agent that executes workspace, target, build and runner jobs assigned
//! to it by the Keel control plane.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: Control-plane operations, implemented by the API client
//! - Bridge: Job queue callbacks the polling loop talks through
//! - Registry: Builder registry resolution at startup
//! - Jobs: One factory per resource type, delegating to providers and the container engine
//! - Scheduler: Job polling and lifecycle management
//!
//! At startup the runner fetches the server configuration, builds its
//! provider manager and job factories, then polls for pending jobs.

mod bootstrap;
mod bridge;
mod builder;
mod config;
mod jobs;
mod logs;
mod podman;
mod provider;
mod registry;
mod repository;
mod scheduler;
mod telemetry;

#[cfg(test)]
mod testing;

use anyhow::Result;
use keel_client::ApiClient;
use keel_core::domain::server::ServerConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bootstrap::{RemoteRunnerParams, init_remote_provider_manager, remote_runner};
use crate::config::Config;
use crate::podman::{PodmanEngine, check_podman_available};
use crate::repository::RunnerRepository;
use crate::scheduler::JobPoller;
use crate::telemetry::LoggingTelemetryService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keel_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Keel Runner");

    // Load configuration
    let config = load_config()?;
    info!(
        "Loaded configuration: runner_id={}, server_api_url={}",
        config.id, config.server_api_url
    );

    let api = Arc::new(ApiClient::new(
        config.server_api_url.clone(),
        config.server_api_key.clone(),
    ));

    info!("API client initialized");

    let server_config = get_server_config_with_retry(api.as_ref()).await?;
    info!("Fetched server configuration for server {}", server_config.id);

    // Build jobs can still run without podman, they just never find an image
    if let Err(e) = check_podman_available() {
        warn!("Podman check failed: {:#}", e);
    }

    let provider_manager =
        init_remote_provider_manager(Arc::clone(&api), &server_config, &config)?;

    let runner = remote_runner(RemoteRunnerParams {
        api,
        server_config,
        config: config.clone(),
        provider_manager,
        container_engine: Arc::new(PodmanEngine::new()),
        image_builder: None,
        telemetry: Arc::new(LoggingTelemetryService::new()),
    })
    .await?;

    info!("Runner initialized successfully");
    info!(
        "Poll interval: {:?}, metadata interval: {:?}, max parallel jobs: {}",
        config.poll_interval, config.metadata_interval, config.max_parallel_jobs
    );

    // Start polling loop
    info!("Starting job polling loop");
    Arc::new(JobPoller::new(runner)).run().await;

    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<Config> {
    match Config::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(e) => {
            warn!("Failed to load config from environment ({}), using defaults", e);
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Fetches the server configuration with retry logic and exponential backoff
///
/// This handles the case where the control plane may not be ready yet when
/// the runner starts (common in container environments).
async fn get_server_config_with_retry<A: RunnerRepository>(api: &A) -> Result<ServerConfig> {
    const MAX_RETRIES: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 500;
    const MAX_DELAY_MS: u64 = 30_000;

    let mut attempt = 0;
    let mut delay_ms = INITIAL_DELAY_MS;

    loop {
        attempt += 1;

        match api.get_server_config().await {
            Ok(dto) => {
                if attempt > 1 {
                    info!(
                        "Fetched server configuration after {} attempt(s)",
                        attempt
                    );
                }
                return Ok(dto.into());
            }
            Err(e) => {
                if attempt >= MAX_RETRIES {
                    error!(
                        "Failed to fetch server configuration after {} attempts",
                        MAX_RETRIES
                    );
                    return Err(anyhow::anyhow!(
                        "Failed to fetch server configuration: {}",
                        e
                    ));
                }

                warn!(
                    "Failed to fetch server configuration (attempt {}/{}): {}",
                    attempt, MAX_RETRIES, e
                );
                warn!("Retrying in {} ms...", delay_ms);

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                // Exponential backoff with cap
                delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, server_config_dto};

    #[tokio::test(start_paused = true)]
    async fn test_server_config_retries_until_available() {
        let api = FakeApi::default();
        api.set_server_config(server_config_dto());
        api.fail_server_config(2);

        let config = get_server_config_with_retry(&api).await.unwrap();

        assert_eq!(config.id, "srv42");
        assert_eq!(config.registry_domain(), "registry-srv42.try-keel.dev");
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_config_gives_up() {
        let api = FakeApi::default();

        let err = get_server_config_with_retry(&api).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to fetch server configuration"));
    }
}
