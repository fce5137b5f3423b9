//! Target domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::runner::ProviderInfo;

/// Infrastructure a provider creates workspaces on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub target_config: TargetConfig,
    pub env_vars: HashMap<String, String>,
    pub is_default: bool,
    pub provider_metadata: Option<String>,
}

/// Named provider configuration a target is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub id: String,
    pub name: String,
    pub provider_info: ProviderInfo,
    /// Provider-specific options as a JSON document
    pub options: String,
    pub deleted: bool,
}
