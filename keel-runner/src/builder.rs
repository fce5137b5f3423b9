//! Image builder plumbing
//!
//! [`BuilderFactory`] carries the registry settings resolved at startup and
//! names the images builds produce. The build itself is delegated to an
//! [`ImageBuilder`] plugin.

use anyhow::Result;
use async_trait::async_trait;
use keel_core::domain::build::Build;
use keel_core::domain::git_provider::GitProviderConfig;
use keel_core::domain::registry::{ContainerRegistries, ContainerRegistry};
use std::path::PathBuf;
use std::sync::Arc;

use crate::logs::JobLogger;

/// Everything an image builder needs for one build
pub struct BuildRequest<'a> {
    pub build: Build,
    /// Reference the produced image is pushed as
    pub image: String,
    /// Image the build container runs
    pub builder_image: String,
    /// Registry the produced image is pushed to
    pub registry: ContainerRegistry,
    /// Registries base images may be pulled from
    pub container_registries: ContainerRegistries,
    pub default_workspace_image: String,
    pub default_workspace_user: String,
    /// Scratch directory for this build
    pub work_dir: PathBuf,
    /// Images of earlier successful builds of the same repository
    pub cache_from: Vec<String>,
    pub git_provider_configs: Vec<GitProviderConfig>,
    pub logger: &'a JobLogger,
}

#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(&self, request: BuildRequest<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct BuilderFactoryConfig {
    pub image: String,
    pub container_registries: ContainerRegistries,
    pub build_image_container_registry: ContainerRegistry,
    /// Normalized namespace: empty or `/`-prefixed without a trailing slash
    pub build_image_namespace: String,
    pub default_workspace_image: String,
    pub default_workspace_user: String,
}

pub struct BuilderFactory {
    config: BuilderFactoryConfig,
    image_builder: Option<Arc<dyn ImageBuilder>>,
}

impl BuilderFactory {
    pub fn new(config: BuilderFactoryConfig, image_builder: Option<Arc<dyn ImageBuilder>>) -> Self {
        Self {
            config,
            image_builder,
        }
    }

    pub fn config(&self) -> &BuilderFactoryConfig {
        &self.config
    }

    pub fn image_builder(&self) -> Option<Arc<dyn ImageBuilder>> {
        self.image_builder.clone()
    }

    /// Reference of the image produced by `build_id`
    pub fn image_name(&self, build_id: &str) -> String {
        format!(
            "{}{}/b-{}:latest",
            self.config.build_image_container_registry.server,
            self.config.build_image_namespace,
            build_id
        )
    }
}
