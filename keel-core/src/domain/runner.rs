//! Runner domain model
//!
//! Liveness and capacity information the runner pushes to the control plane.

use serde::{Deserialize, Serialize};

/// Metadata reported periodically by a runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerMetadata {
    /// Seconds since the runner process started
    pub uptime: u64,

    /// Providers currently installed on the runner, in registration order
    pub providers: Vec<ProviderInfo>,

    /// Number of jobs currently executing, if known
    pub running_jobs: Option<u64>,
}

/// Identity of a pluggable provider installed on a runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub runner_id: String,
    pub runner_name: String,
    pub version: String,
    pub label: Option<String>,
    pub agentless: bool,
    /// Schema of the target config options this provider accepts
    pub target_config_manifest: serde_json::Value,
}
