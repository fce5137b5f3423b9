//! Environment variable helpers
//!
//! Container registries are declared through environment variables:
//!
//! ```text
//! <PREFIX>_CONTAINER_REGISTRY_SERVER=registry.example.com
//! <PREFIX>_CONTAINER_REGISTRY_USERNAME=bot
//! <PREFIX>_CONTAINER_REGISTRY_PASSWORD=secret
//! ```
//!
//! Only the `_SERVER` variable is required; the credentials are optional.

use std::collections::HashMap;

use crate::domain::registry::{ContainerRegistries, ContainerRegistry};

const SERVER_SUFFIX: &str = "_CONTAINER_REGISTRY_SERVER";
const USERNAME_SUFFIX: &str = "_CONTAINER_REGISTRY_USERNAME";
const PASSWORD_SUFFIX: &str = "_CONTAINER_REGISTRY_PASSWORD";

/// Merges two variable sets, `overrides` winning on key collisions
pub fn merge_env_vars(
    base: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn is_registry_key(key: &str) -> bool {
    key.ends_with(SERVER_SUFFIX) || key.ends_with(USERNAME_SUFFIX) || key.ends_with(PASSWORD_SUFFIX)
}

/// Splits registry declarations out of a variable set
///
/// Returns the variables that are not part of a registry declaration and
/// every declared registry, keyed by server. When several prefixes declare
/// the same server, the alphabetically first prefix wins.
pub fn extract_container_registries(
    vars: &HashMap<String, String>,
) -> (HashMap<String, String>, ContainerRegistries) {
    let mut remaining = HashMap::new();
    let mut registries = ContainerRegistries::new();

    let mut entries: Vec<(&String, &String)> = vars.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        if let Some(prefix) = key.strip_suffix(SERVER_SUFFIX) {
            if value.is_empty() {
                continue;
            }
            let lookup = |suffix: &str| {
                vars.get(&format!("{}{}", prefix, suffix))
                    .cloned()
                    .unwrap_or_default()
            };
            registries
                .entry(value.clone())
                .or_insert_with(|| ContainerRegistry {
                    server: value.clone(),
                    username: lookup(USERNAME_SUFFIX),
                    password: lookup(PASSWORD_SUFFIX),
                });
        } else if !is_registry_key(key) {
            remaining.insert(key.clone(), value.clone());
        }
    }

    (remaining, registries)
}

/// Finds the registry declared for `server`, if any
pub fn find_container_registry(
    vars: &HashMap<String, String>,
    server: &str,
) -> Option<ContainerRegistry> {
    let (_, mut registries) = extract_container_registries(vars);
    registries.remove(server)
}
