//! Container registry domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A container registry and the credentials used to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRegistry {
    pub server: String,
    pub username: String,
    pub password: String,
}

impl ContainerRegistry {
    /// Registry known only by its server address
    pub fn from_server(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }
}

/// Registries keyed by server address
pub type ContainerRegistries = BTreeMap<String, ContainerRegistry>;
