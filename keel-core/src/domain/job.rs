//! Job domain types

use serde::{Deserialize, Serialize};

/// A unit of work targeting one resource
///
/// Jobs are created by the control plane and polled by the runner. The runner
/// never keeps a job around between polls; state changes are always reported
/// back through the job queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub resource_id: String,
    pub runner_id: Option<String>,
    pub resource_type: ResourceType,
    pub state: JobState,
    pub action: JobAction,
    pub metadata: Option<String>,
    pub error: Option<String>,
}

/// Kind of resource a job operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Workspace,
    Target,
    Build,
    Runner,
}

/// Job lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Running,
    Success,
    Error,
}

/// Action requested by a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobAction {
    Create,
    Start,
    Stop,
    Restart,
    Delete,
    ForceDelete,
    Build,
    InstallProvider,
    UninstallProvider,
    UpdateProvider,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Workspace => write!(f, "workspace"),
            ResourceType::Target => write!(f, "target"),
            ResourceType::Build => write!(f, "build"),
            ResourceType::Runner => write!(f, "runner"),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Running => write!(f, "running"),
            JobState::Success => write!(f, "success"),
            JobState::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobAction::Create => "create",
            JobAction::Start => "start",
            JobAction::Stop => "stop",
            JobAction::Restart => "restart",
            JobAction::Delete => "delete",
            JobAction::ForceDelete => "force-delete",
            JobAction::Build => "build",
            JobAction::InstallProvider => "install-provider",
            JobAction::UninstallProvider => "uninstall-provider",
            JobAction::UpdateProvider => "update-provider",
        };
        write!(f, "{}", name)
    }
}

impl JobState {
    /// Whether the job has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Error)
    }
}
