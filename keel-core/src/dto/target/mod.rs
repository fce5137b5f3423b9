//! Target and target config DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conversion::{Conversion, ConversionError, Convert};
use crate::domain::target::{Target, TargetConfig};

use super::runner::ProviderInfoDto;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_config: TargetConfigDto,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
    #[serde(default, rename = "default")]
    pub is_default: bool,
    #[serde(default)]
    pub provider_metadata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfigDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider_info: ProviderInfoDto,
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Request to register a new target config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTargetConfigDto {
    pub name: String,
    pub options: String,
    pub provider_info: ProviderInfoDto,
}

impl Convert<TargetConfig> for TargetConfigDto {
    fn convert(&self) -> Result<Conversion<TargetConfig>, ConversionError> {
        if self.name.is_empty() {
            return Ok(Conversion::Empty);
        }

        let provider_info = self
            .provider_info
            .convert()?
            .into_option()
            .ok_or_else(|| ConversionError::missing("TargetConfig", "providerInfo"))?;

        if !self.options.is_empty() {
            serde_json::from_str::<serde_json::Value>(&self.options)
                .map_err(|e| ConversionError::invalid("TargetConfig", "options", e.to_string()))?;
        }

        Ok(Conversion::Value(TargetConfig {
            id: self.id.clone(),
            name: self.name.clone(),
            provider_info,
            options: self.options.clone(),
            deleted: self.deleted,
        }))
    }
}

impl Convert<Target> for TargetDto {
    fn convert(&self) -> Result<Conversion<Target>, ConversionError> {
        if self.id.is_empty() {
            return Ok(Conversion::Empty);
        }

        let target_config = self
            .target_config
            .convert()?
            .into_option()
            .ok_or_else(|| ConversionError::missing("Target", "targetConfig"))?;

        Ok(Conversion::Value(Target {
            id: self.id.clone(),
            name: self.name.clone(),
            target_config,
            env_vars: self.env_vars.clone(),
            is_default: self.is_default,
            provider_metadata: self.provider_metadata.clone(),
        }))
    }
}
