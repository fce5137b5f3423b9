//! Build domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::workspace::GitRepository;

/// A workspace image build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    /// Image produced by the build, set once it succeeded
    pub image: Option<String>,
    pub user: Option<String>,
    pub container_config: ContainerConfig,
    pub build_config: Option<BuildConfig>,
    pub repository: GitRepository,
    pub env_vars: HashMap<String, String>,
    pub prebuild_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A build together with its current lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub build: Build,
    pub state: BuildState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildState {
    PendingRun,
    Running,
    Success,
    Error,
    PendingDelete,
    PendingForcedDelete,
    Deleting,
}

/// Image and user the build container starts from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: String,
    pub user: String,
}

/// How the workspace image is described inside the repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Path to a devcontainer definition, if the repository has one
    pub devcontainer_file_path: Option<String>,
}

impl BuildState {
    /// Parses the wire representation of a build state
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending-run" => Some(BuildState::PendingRun),
            "running" => Some(BuildState::Running),
            "success" => Some(BuildState::Success),
            "error" => Some(BuildState::Error),
            "pending-delete" => Some(BuildState::PendingDelete),
            "pending-forced-delete" => Some(BuildState::PendingForcedDelete),
            "deleting" => Some(BuildState::Deleting),
            _ => None,
        }
    }
}
