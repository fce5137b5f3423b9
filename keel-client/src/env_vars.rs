//! Environment variable endpoints

use crate::ApiClient;
use crate::error::Result;
use keel_core::dto::env::EnvironmentVariableDto;

impl ApiClient {
    /// List the globally configured environment variables
    pub async fn list_environment_variables(&self) -> Result<Vec<EnvironmentVariableDto>> {
        let response = self.get("/env").send().await?;

        self.handle_response(response).await
    }
}
