//! Workspace endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::workspace::{UpdateProviderMetadataDto, WorkspaceDto};

impl ApiClient {
    /// Get a workspace by ID
    pub async fn get_workspace(&self, workspace_id: &str) -> Result<WorkspaceDto> {
        let response = self
            .get(&format!("/workspace/{}", segment(workspace_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Store the provider metadata of a workspace
    pub async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> Result<()> {
        let response = self
            .post(&format!("/workspace/{}/provider-metadata", segment(workspace_id)))
            .json(metadata)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
