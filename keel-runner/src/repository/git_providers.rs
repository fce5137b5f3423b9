//! Git providers repository

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::git_provider::GitProviderDto;

/// Repository trait for git provider configs
#[async_trait]
pub trait GitProviderRepository: Send + Sync {
    async fn get_git_provider(&self, id: &str) -> Result<GitProviderDto>;

    /// Lists configs applicable to an already percent-encoded repository URL
    async fn list_git_providers_for_url(&self, escaped_repo_url: &str)
    -> Result<Vec<GitProviderDto>>;
}

#[async_trait]
impl GitProviderRepository for ApiClient {
    async fn get_git_provider(&self, id: &str) -> Result<GitProviderDto> {
        ApiClient::get_git_provider(self, id).await
    }

    async fn list_git_providers_for_url(
        &self,
        escaped_repo_url: &str,
    ) -> Result<Vec<GitProviderDto>> {
        ApiClient::list_git_providers_for_url(self, escaped_repo_url).await
    }
}
