//! Git provider domain types

use serde::{Deserialize, Serialize};

/// Credentials and endpoint for a git hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitProviderConfig {
    pub id: String,
    /// Hosting provider kind, e.g. "github" or "gitlab"
    pub provider_id: String,
    pub username: String,
    pub token: String,
    pub alias: String,
    pub base_api_url: Option<String>,
    pub signing_key: Option<String>,
    pub signing_method: Option<String>,
}
