//! Target and target config endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::target::{AddTargetConfigDto, TargetConfigDto, TargetDto};
use keel_core::dto::workspace::UpdateProviderMetadataDto;

impl ApiClient {
    // =============================================================================
    // Targets
    // =============================================================================

    /// Get a target by ID
    pub async fn get_target(&self, target_id: &str) -> Result<TargetDto> {
        let response = self.get(&format!("/target/{}", segment(target_id))).send().await?;

        self.handle_response(response).await
    }

    /// Acknowledge that a target was created successfully
    pub async fn handle_successful_creation(&self, target_id: &str) -> Result<()> {
        let response = self
            .post(&format!(
                "/target/{}/handle-successful-creation",
                segment(target_id)
            ))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Store the provider metadata of a target
    pub async fn update_target_provider_metadata(
        &self,
        target_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()> {
        let response = self
            .post(&format!("/target/{}/provider-metadata", segment(target_id)))
            .json(metadata)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Target Configs
    // =============================================================================

    /// List all target configs
    pub async fn list_target_configs(&self) -> Result<Vec<TargetConfigDto>> {
        let response = self.get("/target-config").send().await?;

        self.handle_response(response).await
    }

    /// Register a new target config
    pub async fn add_target_config(&self, config: &AddTargetConfigDto) -> Result<TargetConfigDto> {
        let response = self.put("/target-config").json(config).send().await?;

        self.handle_response(response).await
    }
}
