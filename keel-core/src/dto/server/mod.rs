//! Server configuration DTOs

use serde::{Deserialize, Serialize};

use crate::domain::server::{FrpsConfig, ServerConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfigDto {
    pub id: String,
    #[serde(default)]
    pub frps: Option<FrpsConfigDto>,
    #[serde(default)]
    pub api_port: u32,
    #[serde(default)]
    pub headscale_port: u32,
    #[serde(default)]
    pub registry_url: String,
    #[serde(default)]
    pub builder_image: String,
    #[serde(default)]
    pub builder_registry_server: String,
    #[serde(default)]
    pub build_image_namespace: Option<String>,
    #[serde(default)]
    pub default_workspace_image: String,
    #[serde(default)]
    pub default_workspace_user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrpsConfigDto {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub protocol: String,
}

impl From<ServerConfigDto> for ServerConfig {
    fn from(dto: ServerConfigDto) -> Self {
        let frps = dto.frps.unwrap_or_default();
        ServerConfig {
            id: dto.id,
            frps: FrpsConfig {
                domain: frps.domain,
                port: frps.port,
                protocol: frps.protocol,
            },
            api_port: dto.api_port,
            headscale_port: dto.headscale_port,
            registry_url: dto.registry_url,
            builder_image: dto.builder_image,
            builder_registry_server: dto.builder_registry_server,
            build_image_namespace: dto.build_image_namespace,
            default_workspace_image: dto.default_workspace_image,
            default_workspace_user: dto.default_workspace_user,
        }
    }
}
