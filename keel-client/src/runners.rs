//! Runner and server endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::runner::{NetworkKeyDto, SetRunnerMetadataDto};
use keel_core::dto::server::ServerConfigDto;

impl ApiClient {
    // =============================================================================
    // Runner Metadata
    // =============================================================================

    /// Push runner uptime, providers and running job count
    pub async fn set_runner_metadata(
        &self,
        runner_id: &str,
        metadata: &SetRunnerMetadataDto,
    ) -> Result<()> {
        let response = self
            .post(&format!("/runner/{}/metadata", segment(runner_id)))
            .json(metadata)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Server
    // =============================================================================

    /// Generate a key a provider uses to join the server network
    pub async fn generate_network_key(&self) -> Result<NetworkKeyDto> {
        let response = self.post("/server/network-key").send().await?;

        self.handle_response(response).await
    }

    /// Fetch the server defaults a runner builds against
    pub async fn get_server_config(&self) -> Result<ServerConfigDto> {
        let response = self.get("/server/config").send().await?;

        self.handle_response(response).await
    }
}
