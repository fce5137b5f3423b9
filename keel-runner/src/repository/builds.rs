//! Builds repository

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::build::BuildDto;

/// Repository trait for build records
#[async_trait]
pub trait BuildRepository: Send + Sync {
    async fn get_build(&self, build_id: &str) -> Result<BuildDto>;

    /// Lists successful builds for an already percent-encoded repository URL
    async fn list_successful_builds(&self, escaped_repo_url: &str) -> Result<Vec<BuildDto>>;
}

#[async_trait]
impl BuildRepository for ApiClient {
    async fn get_build(&self, build_id: &str) -> Result<BuildDto> {
        ApiClient::get_build(self, build_id).await
    }

    async fn list_successful_builds(&self, escaped_repo_url: &str) -> Result<Vec<BuildDto>> {
        ApiClient::list_successful_builds(self, escaped_repo_url).await
    }
}
