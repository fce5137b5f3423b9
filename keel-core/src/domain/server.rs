//! Server configuration as seen by a runner

use serde::{Deserialize, Serialize};

/// Defaults published by the control plane that a runner builds against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    pub frps: FrpsConfig,
    pub api_port: u32,
    pub headscale_port: u32,
    pub registry_url: String,
    pub builder_image: String,
    pub builder_registry_server: String,
    pub build_image_namespace: Option<String>,
    pub default_workspace_image: String,
    pub default_workspace_user: String,
}

/// Tunnel through which the server and its registry are reachable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrpsConfig {
    pub domain: String,
    pub port: u32,
    pub protocol: String,
}

impl ServerConfig {
    /// Registry reachable through the tunnel, one subdomain per server
    pub fn registry_domain(&self) -> String {
        format!("registry-{}.{}", self.id, self.frps.domain)
    }

    /// API endpoint reachable through the tunnel
    pub fn tunnel_api_url(&self) -> String {
        format!("{}://api-{}.{}", self.frps.protocol, self.id, self.frps.domain)
    }

    /// Headscale coordination endpoint reachable through the tunnel
    pub fn headscale_url(&self) -> String {
        format!("{}://{}.{}", self.frps.protocol, self.id, self.frps.domain)
    }
}
