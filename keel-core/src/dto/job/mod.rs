//! Job DTOs exchanged with the control plane

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::{JobAction, JobState, ResourceType};

/// Job record as returned by the runner job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: String,
    pub resource_id: String,
    #[serde(default)]
    pub runner_id: Option<String>,
    pub resource_type: ResourceTypeDto,
    pub state: JobStateDto,
    pub action: JobActionDto,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTypeDto {
    Workspace,
    Target,
    Build,
    Runner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStateDto {
    Pending,
    Running,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobActionDto {
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

/// A listed job record that could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedJob {
    /// The record's `id`, when it has a string one
    pub id: Option<String>,
    pub reason: String,
}

/// Parses a job listing one record at a time
///
/// A record the runner cannot read, such as a job with an action it does not
/// know, is rejected on its own and the remaining jobs keep their order.
pub fn parse_job_listing(records: Vec<Value>) -> (Vec<JobDto>, Vec<RejectedJob>) {
    let mut jobs = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        let id = record.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<JobDto>(record) {
            Ok(job) => jobs.push(job),
            Err(e) => rejected.push(RejectedJob {
                id,
                reason: e.to_string(),
            }),
        }
    }

    (jobs, rejected)
}

/// Job state update from runner to control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobStateDto {
    pub state: JobStateDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<ResourceTypeDto> for ResourceType {
    fn from(dto: ResourceTypeDto) -> Self {
        match dto {
            ResourceTypeDto::Workspace => ResourceType::Workspace,
            ResourceTypeDto::Target => ResourceType::Target,
            ResourceTypeDto::Build => ResourceType::Build,
            ResourceTypeDto::Runner => ResourceType::Runner,
        }
    }
}

impl From<ResourceType> for ResourceTypeDto {
    fn from(resource_type: ResourceType) -> Self {
        match resource_type {
            ResourceType::Workspace => ResourceTypeDto::Workspace,
            ResourceType::Target => ResourceTypeDto::Target,
            ResourceType::Build => ResourceTypeDto::Build,
            ResourceType::Runner => ResourceTypeDto::Runner,
        }
    }
}

impl From<JobStateDto> for JobState {
    fn from(dto: JobStateDto) -> Self {
        match dto {
            JobStateDto::Pending => JobState::Pending,
            JobStateDto::Running => JobState::Running,
            JobStateDto::Success => JobState::Success,
            JobStateDto::Error => JobState::Error,
        }
    }
}

impl From<JobState> for JobStateDto {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Pending => JobStateDto::Pending,
            JobState::Running => JobStateDto::Running,
            JobState::Success => JobStateDto::Success,
            JobState::Error => JobStateDto::Error,
        }
    }
}

impl From<JobActionDto> for JobAction {
    fn from(dto: JobActionDto) -> Self {
        match dto {
            JobActionDto::Create => JobAction::Create,
            JobActionDto::Start => JobAction::Start,
            JobActionDto::Stop => JobAction::Stop,
            JobActionDto::Restart => JobAction::Restart,
            JobActionDto::Delete => JobAction::Delete,
            JobActionDto::ForceDelete => JobAction::ForceDelete,
            JobActionDto::Build => JobAction::Build,
            JobActionDto::InstallProvider => JobAction::InstallProvider,
            JobActionDto::UninstallProvider => JobAction::UninstallProvider,
            JobActionDto::UpdateProvider => JobAction::UpdateProvider,
        }
    }
}

impl From<JobAction> for JobActionDto {
    fn from(action: JobAction) -> Self {
        match action {
            JobAction::Create => JobActionDto::Create,
            JobAction::Start => JobActionDto::Start,
            JobAction::Stop => JobActionDto::Stop,
            JobAction::Restart => JobActionDto::Restart,
            JobAction::Delete => JobActionDto::Delete,
            JobAction::ForceDelete => JobActionDto::ForceDelete,
            JobAction::Build => JobActionDto::Build,
            JobAction::InstallProvider => JobActionDto::InstallProvider,
            JobAction::UninstallProvider => JobActionDto::UninstallProvider,
            JobAction::UpdateProvider => JobActionDto::UpdateProvider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_mapping_is_lossless() {
        for dto in [
            ResourceTypeDto::Workspace,
            ResourceTypeDto::Target,
            ResourceTypeDto::Build,
            ResourceTypeDto::Runner,
        ] {
            assert_eq!(ResourceTypeDto::from(ResourceType::from(dto)), dto);
        }

        for dto in [
            JobStateDto::Pending,
            JobStateDto::Running,
            JobStateDto::Success,
            JobStateDto::Error,
        ] {
            assert_eq!(JobStateDto::from(JobState::from(dto)), dto);
        }

        for dto in [
            JobActionDto::Create,
            JobActionDto::Start,
            JobActionDto::Stop,
            JobActionDto::Restart,
            JobActionDto::Delete,
            JobActionDto::ForceDelete,
            JobActionDto::Build,
            JobActionDto::InstallProvider,
            JobActionDto::UninstallProvider,
            JobActionDto::UpdateProvider,
        ] {
            assert_eq!(JobActionDto::from(JobAction::from(dto)), dto);
        }
    }

    #[test]
    fn test_job_dto_wire_format() {
        let json = serde_json::json!({
            "id": "job-1",
            "resourceId": "build-1",
            "runnerId": "runner-1",
            "resourceType": "build",
            "state": "pending",
            "action": "force-delete",
            "metadata": "{\"force\":true}"
        });

        let dto: JobDto = serde_json::from_value(json).unwrap();
        assert_eq!(dto.resource_type, ResourceTypeDto::Build);
        assert_eq!(dto.state, JobStateDto::Pending);
        assert_eq!(dto.action, JobActionDto::ForceDelete);
        assert_eq!(dto.error, None);
    }

    #[test]
    fn test_update_job_state_omits_missing_error() {
        let update = UpdateJobStateDto {
            state: JobStateDto::Success,
            error_message: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "success" }));
    }

    #[test]
    fn test_listing_keeps_jobs_around_unknown_values() {
        let record = |id: &str, resource_type: &str, state: &str, action: &str| {
            serde_json::json!({
                "id": id,
                "resourceId": "r1",
                "resourceType": resource_type,
                "state": state,
                "action": action
            })
        };
        let records = vec![
            record("j1", "build", "pending", "build"),
            record("j2", "workspace", "pending", "resize"),
            record("j3", "target", "pending", "start"),
            record("j4", "volume", "pending", "create"),
            record("j5", "build", "paused", "build"),
            serde_json::json!({ "resourceId": "r1" }),
        ];

        let (jobs, rejected) = parse_job_listing(records);

        let ids: Vec<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j3"]);
        let rejected_ids: Vec<Option<&str>> = rejected.iter().map(|r| r.id.as_deref()).collect();
        assert_eq!(
            rejected_ids,
            vec![Some("j2"), Some("j4"), Some("j5"), None]
        );
        assert!(rejected[0].reason.contains("resize"));
    }
}
