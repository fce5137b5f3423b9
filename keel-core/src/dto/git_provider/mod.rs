//! Git provider DTOs

use serde::{Deserialize, Serialize};

use crate::conversion::{Conversion, ConversionError, Convert};
use crate::domain::git_provider::GitProviderConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitProviderDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub base_api_url: Option<String>,
    #[serde(default)]
    pub signing_key: Option<String>,
    #[serde(default)]
    pub signing_method: Option<String>,
}

impl Convert<GitProviderConfig> for GitProviderDto {
    fn convert(&self) -> Result<Conversion<GitProviderConfig>, ConversionError> {
        if self.id.is_empty() {
            return Ok(Conversion::Empty);
        }
        if self.provider_id.is_empty() {
            return Err(ConversionError::missing("GitProvider", "providerId"));
        }

        Ok(Conversion::Value(GitProviderConfig {
            id: self.id.clone(),
            provider_id: self.provider_id.clone(),
            username: self.username.clone(),
            token: self.token.clone(),
            alias: self.alias.clone(),
            base_api_url: self.base_api_url.clone(),
            signing_key: self.signing_key.clone(),
            signing_method: self.signing_method.clone(),
        }))
    }
}
