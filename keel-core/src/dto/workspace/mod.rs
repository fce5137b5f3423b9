//! Workspace DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conversion::{Conversion, ConversionError, Convert};
use crate::domain::build::BuildConfig;
use crate::domain::workspace::{GitRepository, Workspace};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub repository: GitRepositoryDto,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub build_config: Option<BuildConfigDto>,
    #[serde(default)]
    pub git_provider_config_id: Option<String>,
    #[serde(default)]
    pub provider_metadata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryDto {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigDto {
    #[serde(default)]
    pub devcontainer: Option<DevcontainerConfigDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevcontainerConfigDto {
    pub file_path: String,
}

/// Opaque provider metadata pushed after a provider operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProviderMetadataDto {
    pub metadata: String,
}

impl From<&GitRepositoryDto> for GitRepository {
    fn from(dto: &GitRepositoryDto) -> Self {
        GitRepository {
            url: dto.url.clone(),
            name: dto.name.clone(),
            owner: dto.owner.clone(),
            branch: dto.branch.clone(),
            sha: dto.sha.clone(),
            source: dto.source.clone(),
        }
    }
}

impl From<&BuildConfigDto> for BuildConfig {
    fn from(dto: &BuildConfigDto) -> Self {
        BuildConfig {
            devcontainer_file_path: dto.devcontainer.as_ref().map(|d| d.file_path.clone()),
        }
    }
}

impl Convert<Workspace> for WorkspaceDto {
    fn convert(&self) -> Result<Conversion<Workspace>, ConversionError> {
        if self.id.is_empty() {
            return Ok(Conversion::Empty);
        }
        if self.target_id.is_empty() {
            return Err(ConversionError::missing("Workspace", "targetId"));
        }

        Ok(Conversion::Value(Workspace {
            id: self.id.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
            user: self.user.clone(),
            target_id: self.target_id.clone(),
            repository: GitRepository::from(&self.repository),
            env_vars: self.env_vars.clone(),
            labels: self.labels.clone().unwrap_or_default(),
            build_config: self.build_config.as_ref().map(BuildConfig::from),
            git_provider_config_id: self.git_provider_config_id.clone(),
            provider_metadata: self.provider_metadata.clone(),
        }))
    }
}
