//! Environment variables repository

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::dto::env::EnvironmentVariableDto;

/// Repository trait for globally configured environment variables
#[async_trait]
pub trait EnvVarRepository: Send + Sync {
    async fn list_environment_variables(&self) -> Result<Vec<EnvironmentVariableDto>>;
}

#[async_trait]
impl EnvVarRepository for ApiClient {
    async fn list_environment_variables(&self) -> Result<Vec<EnvironmentVariableDto>> {
        ApiClient::list_environment_variables(self).await
    }
}
