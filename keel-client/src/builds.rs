//! Build endpoints

use crate::{ApiClient, segment};
use crate::error::Result;
use keel_core::dto::build::BuildDto;

impl ApiClient {
    /// Get a build by ID
    pub async fn get_build(&self, build_id: &str) -> Result<BuildDto> {
        let response = self.get(&format!("/build/{}", segment(build_id))).send().await?;

        self.handle_response(response).await
    }

    /// List successful builds for a repository
    ///
    /// # Arguments
    /// * `escaped_repo_url` - Repository URL, already percent-encoded
    pub async fn list_successful_builds(&self, escaped_repo_url: &str) -> Result<Vec<BuildDto>> {
        let response = self
            .get(&format!("/build/successful/{}", segment(escaped_repo_url)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
