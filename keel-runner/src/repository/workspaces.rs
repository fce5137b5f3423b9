//! Workspaces repository

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::workspace::{UpdateProviderMetadataDto, WorkspaceDto};

/// Repository trait for workspace records
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn get_workspace(&self, workspace_id: &str) -> Result<WorkspaceDto>;

    async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()>;
}

#[async_trait]
impl WorkspaceRepository for ApiClient {
    async fn get_workspace(&self, workspace_id: &str) -> Result<WorkspaceDto> {
        ApiClient::get_workspace(self, workspace_id).await
    }

    async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()> {
        ApiClient::update_workspace_provider_metadata(self, workspace_id, metadata).await
    }
}
