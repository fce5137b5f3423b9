//! Runners repository
//!
//! Handles runner-level communication with the control plane:
//! - Pushing runner metadata (uptime, providers, running jobs)
//! - Generating provider network keys
//! - Fetching the server configuration

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::runner::{NetworkKeyDto, SetRunnerMetadataDto};
use keel_core::dto::server::ServerConfigDto;

/// Repository trait for runner-related operations
#[async_trait]
pub trait RunnerRepository: Send + Sync {
    /// Pushes runner metadata
    ///
    /// Should be called periodically to keep the runner marked as alive.
    async fn set_runner_metadata(
        &self,
        runner_id: &str,
        metadata: &SetRunnerMetadataDto,
    ) -> Result<()>;

    /// Generates a key a provider uses to join the server network
    async fn generate_network_key(&self) -> Result<NetworkKeyDto>;

    /// Fetches the server defaults a runner builds against
    async fn get_server_config(&self) -> Result<ServerConfigDto>;
}

#[async_trait]
impl RunnerRepository for ApiClient {
    async fn set_runner_metadata(
        &self,
        runner_id: &str,
        metadata: &SetRunnerMetadataDto,
    ) -> Result<()> {
        ApiClient::set_runner_metadata(self, runner_id, metadata).await
    }

    async fn generate_network_key(&self) -> Result<NetworkKeyDto> {
        ApiClient::generate_network_key(self).await
    }

    async fn get_server_config(&self) -> Result<ServerConfigDto> {
        ApiClient::get_server_config(self).await
    }
}
