//! Targets repository
//!
//! Targets and the target configs they are created from.

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::target::{AddTargetConfigDto, TargetConfigDto, TargetDto};
use keel_core::dto::workspace::UpdateProviderMetadataDto;

/// Repository trait for target records
#[async_trait]
pub trait TargetRepository: Send + Sync {
    async fn get_target(&self, target_id: &str) -> Result<TargetDto>;

    /// Acknowledges that a target was created successfully
    async fn handle_successful_creation(&self, target_id: &str) -> Result<()>;

    async fn update_target_provider_metadata(
        &self,
        target_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()>;

    async fn list_target_configs(&self) -> Result<Vec<TargetConfigDto>>;

    async fn add_target_config(&self, config: &AddTargetConfigDto) -> Result<TargetConfigDto>;
}

#[async_trait]
impl TargetRepository for ApiClient {
    async fn get_target(&self, target_id: &str) -> Result<TargetDto> {
        ApiClient::get_target(self, target_id).await
    }

    async fn handle_successful_creation(&self, target_id: &str) -> Result<()> {
        ApiClient::handle_successful_creation(self, target_id).await
    }

    async fn update_target_provider_metadata(
        &self,
        target_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()> {
        ApiClient::update_target_provider_metadata(self, target_id, metadata).await
    }

    async fn list_target_configs(&self) -> Result<Vec<TargetConfigDto>> {
        ApiClient::list_target_configs(self).await
    }

    async fn add_target_config(&self, config: &AddTargetConfigDto) -> Result<TargetConfigDto> {
        ApiClient::add_target_config(self, config).await
    }
}
