//! Git provider endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::git_provider::GitProviderDto;

impl ApiClient {
    /// Get a git provider config by ID
    pub async fn get_git_provider(&self, id: &str) -> Result<GitProviderDto> {
        let response = self.get(&format!("/gitprovider/{}", segment(id))).send().await?;

        self.handle_response(response).await
    }

    /// List the git provider configs applicable to a repository
    ///
    /// # Arguments
    /// * `escaped_repo_url` - Repository URL, already percent-encoded
    pub async fn list_git_providers_for_url(
        &self,
        escaped_repo_url: &str,
    ) -> Result<Vec<GitProviderDto>> {
        let response = self
            .get(&format!("/gitprovider/for-url/{}", segment(escaped_repo_url)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
