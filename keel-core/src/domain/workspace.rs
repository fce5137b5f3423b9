//! Workspace domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A development workspace running on a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub image: String,
    pub user: String,
    pub target_id: String,
    pub repository: GitRepository,
    pub env_vars: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub build_config: Option<super::build::BuildConfig>,
    pub git_provider_config_id: Option<String>,
    pub provider_metadata: Option<String>,
}

/// Repository a workspace or build is created from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    pub url: String,
    pub name: String,
    pub owner: String,
    pub branch: Option<String>,
    pub sha: String,
    pub source: String,
}
