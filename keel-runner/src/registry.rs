//! Builder registry resolution
//!
//! Decides which registry build images are pushed to, which registries base
//! images may be pulled from, and the image namespace. Inputs are the server
//! configuration and the globally configured environment variables.
//!
//! Resolution order:
//! 1. the variables cannot be fetched: use the server's static builder
//!    registry and stop
//! 2. a registry declared in the variables for the builder registry server
//! 3. the registry reachable through the server's tunnel domain
//!
//! An empty but successful fetch lands on step 3, not step 1.

use keel_core::domain::registry::{ContainerRegistries, ContainerRegistry};
use keel_core::domain::server::ServerConfig;
use keel_core::dto::env::{EnvironmentVariableDto, to_map};
use keel_core::env::{extract_container_registries, find_container_registry};
use std::fmt::Display;
use tracing::{info, warn};

use crate::repository::EnvVarRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderRegistries {
    /// Registry built images are pushed to
    pub builder_registry: ContainerRegistry,
    /// Every registry declared in the environment variables
    pub container_registries: ContainerRegistries,
    /// Empty or `/`-prefixed without a trailing slash
    pub image_namespace: String,
}

/// Normalizes an image namespace to `/name`, or `""` when unset
pub fn normalize_namespace(namespace: Option<&str>) -> String {
    let trimmed = namespace.unwrap_or_default().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Resolves registries from the outcome of the environment variable fetch
pub fn resolve_builder_registries<E: Display>(
    env_vars: Result<Vec<EnvironmentVariableDto>, E>,
    server_config: &ServerConfig,
) -> BuilderRegistries {
    let image_namespace = normalize_namespace(server_config.build_image_namespace.as_deref());

    let vars = match env_vars {
        Ok(vars) => to_map(&vars),
        Err(e) => {
            warn!(
                "Failed to fetch environment variables, using builder registry {}: {}",
                server_config.builder_registry_server, e
            );
            return BuilderRegistries {
                builder_registry: ContainerRegistry::from_server(
                    &server_config.builder_registry_server,
                ),
                container_registries: ContainerRegistries::new(),
                image_namespace,
            };
        }
    };

    let declared = if vars.is_empty() {
        None
    } else {
        find_container_registry(&vars, &server_config.builder_registry_server)
    };
    let builder_registry = declared
        .unwrap_or_else(|| ContainerRegistry::from_server(server_config.registry_domain()));

    let (_, container_registries) = extract_container_registries(&vars);

    BuilderRegistries {
        builder_registry,
        container_registries,
        image_namespace,
    }
}

/// Fetches the environment variables once and resolves registries from them
pub async fn resolve<A>(api: &A, server_config: &ServerConfig) -> BuilderRegistries
where
    A: EnvVarRepository + ?Sized,
{
    let registries =
        resolve_builder_registries(api.list_environment_variables().await, server_config);

    info!(
        "Builder registry: {} ({} pull registr{})",
        registries.builder_registry.server,
        registries.container_registries.len(),
        if registries.container_registries.len() == 1 {
            "y"
        } else {
            "ies"
        }
    );

    registries
}
