//! Build DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conversion::{Conversion, ConversionError, Convert};
use crate::domain::build::{Build, BuildConfig, BuildRecord, BuildState, ContainerConfig};
use crate::domain::workspace::GitRepository;

use super::workspace::{BuildConfigDto, GitRepositoryDto};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub container_config: ContainerConfigDto,
    #[serde(default)]
    pub build_config: Option<BuildConfigDto>,
    #[serde(default)]
    pub repository: GitRepositoryDto,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
    #[serde(default)]
    pub prebuild_id: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfigDto {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub user: String,
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConversionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ConversionError::invalid("Build", field, e.to_string()))
}

impl Convert<BuildRecord> for BuildDto {
    fn convert(&self) -> Result<Conversion<BuildRecord>, ConversionError> {
        if self.id.is_empty() {
            return Ok(Conversion::Empty);
        }

        let state = BuildState::parse(&self.state).ok_or_else(|| {
            ConversionError::invalid("Build", "state", format!("unknown state '{}'", self.state))
        })?;

        let build = Build {
            id: self.id.clone(),
            image: self.image.clone(),
            user: self.user.clone(),
            container_config: ContainerConfig {
                image: self.container_config.image.clone(),
                user: self.container_config.user.clone(),
            },
            build_config: self.build_config.as_ref().map(BuildConfig::from),
            repository: GitRepository::from(&self.repository),
            env_vars: self.env_vars.clone(),
            prebuild_id: self.prebuild_id.clone(),
            created_at: parse_timestamp("createdAt", &self.created_at)?,
            updated_at: parse_timestamp("updatedAt", &self.updated_at)?,
        };

        Ok(Conversion::Value(BuildRecord { build, state }))
    }
}
