//! Runner DTOs
//!
//! Data transfer objects for runner metadata and provider identity.

use serde::{Deserialize, Serialize};

use crate::conversion::{Conversion, ConversionError, Convert};
use crate::domain::runner::ProviderInfo;

/// Provider identity on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfoDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub runner_id: String,
    #[serde(default)]
    pub runner_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub agentless: bool,
    #[serde(default)]
    pub target_config_manifest: serde_json::Value,
}

/// Liveness and capacity report sent by a runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRunnerMetadataDto {
    pub uptime: u64,
    pub providers: Vec<ProviderInfoDto>,
    /// Omitted entirely when the runner does not know its job count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_jobs: Option<u64>,
}

/// Key a provider uses to join the server network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkKeyDto {
    pub key: String,
}

fn check_manifest(manifest: &serde_json::Value) -> Result<(), ConversionError> {
    match manifest {
        serde_json::Value::Null | serde_json::Value::Object(_) => Ok(()),
        other => Err(ConversionError::invalid(
            "ProviderInfo",
            "targetConfigManifest",
            format!("expected an object, got {}", other),
        )),
    }
}

impl Convert<ProviderInfoDto> for ProviderInfo {
    fn convert(&self) -> Result<Conversion<ProviderInfoDto>, ConversionError> {
        if self.name.is_empty() && self.version.is_empty() {
            return Ok(Conversion::Empty);
        }
        if self.name.is_empty() {
            return Err(ConversionError::missing("ProviderInfo", "name"));
        }
        check_manifest(&self.target_config_manifest)?;

        Ok(Conversion::Value(ProviderInfoDto {
            name: self.name.clone(),
            runner_id: self.runner_id.clone(),
            runner_name: self.runner_name.clone(),
            version: self.version.clone(),
            label: self.label.clone(),
            agentless: self.agentless,
            target_config_manifest: self.target_config_manifest.clone(),
        }))
    }
}

impl Convert<ProviderInfo> for ProviderInfoDto {
    fn convert(&self) -> Result<Conversion<ProviderInfo>, ConversionError> {
        if self.name.is_empty() && self.version.is_empty() {
            return Ok(Conversion::Empty);
        }
        if self.name.is_empty() {
            return Err(ConversionError::missing("ProviderInfo", "name"));
        }
        check_manifest(&self.target_config_manifest)?;

        Ok(Conversion::Value(ProviderInfo {
            name: self.name.clone(),
            runner_id: self.runner_id.clone(),
            runner_name: self.runner_name.clone(),
            version: self.version.clone(),
            label: self.label.clone(),
            agentless: self.agentless,
            target_config_manifest: self.target_config_manifest.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, version: &str) -> ProviderInfo {
        ProviderInfo {
            name: name.to_string(),
            runner_id: "runner-1".to_string(),
            runner_name: "local".to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_provider_info_converts() {
        let dto = provider("docker-provider", "v0.1.0").convert().unwrap();
        let Conversion::Value(dto) = dto else {
            panic!("expected a value");
        };
        assert_eq!(dto.name, "docker-provider");
        assert_eq!(dto.runner_name, "local");
    }

    #[test]
    fn test_blank_provider_info_is_empty() {
        let result: Conversion<ProviderInfoDto> = ProviderInfo::default().convert().unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_provider_info_without_name_fails() {
        let result: Result<Conversion<ProviderInfoDto>, _> = provider("", "v1").convert();
        assert_eq!(
            result.unwrap_err(),
            ConversionError::missing("ProviderInfo", "name")
        );
    }

    #[test]
    fn test_provider_info_rejects_non_object_manifest() {
        let mut info = provider("aws-provider", "v1");
        info.target_config_manifest = serde_json::json!([1, 2]);
        let result: Result<Conversion<ProviderInfoDto>, _> = info.convert();
        assert!(result.is_err());
    }

    #[test]
    fn test_running_jobs_omitted_when_absent() {
        let dto = SetRunnerMetadataDto {
            uptime: 12,
            providers: vec![],
            running_jobs: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("runningJobs").is_none());
        assert_eq!(json["uptime"], 12);
    }
}
