//! Environment variable DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A globally configured environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariableDto {
    pub key: String,
    pub value: String,
}

/// Collapses a variable list into a map; later entries win on duplicate keys
pub fn to_map(vars: &[EnvironmentVariableDto]) -> HashMap<String, String> {
    vars.iter()
        .map(|var| (var.key.clone(), var.value.clone()))
        .collect()
}
