//! Podman container engine
//!
//! Image operations the build jobs need from the local container engine:
//! - Checking podman availability at startup
//! - Inspecting whether an image exists locally
//! - Deleting an image, optionally forced

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Command;
use tracing::{debug, error, info};

/// Checks if podman is installed and available
pub fn check_podman_available() -> Result<()> {
    let output = Command::new("podman")
        .arg("--version")
        .output()
        .context("Failed to execute 'podman --version'. Is podman installed?")?;

    if !output.status.success() {
        anyhow::bail!("Podman is not working correctly");
    }

    let version = String::from_utf8_lossy(&output.stdout);
    info!("Podman is available: {}", version.trim());

    Ok(())
}

/// Local image store operations
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Whether `image` is present in the local store
    ///
    /// Any failure to inspect counts as "not present".
    async fn image_exists(&self, image: &str) -> bool;

    /// Removes `image` from the local store
    async fn delete_image(&self, image: &str, force: bool) -> Result<()>;
}

/// [`ContainerEngine`] backed by the podman CLI
#[derive(Debug, Clone)]
pub struct PodmanEngine {
    binary: String,
}

impl PodmanEngine {
    pub fn new() -> Self {
        Self {
            binary: "podman".to_string(),
        }
    }

    /// Uses a different podman-compatible binary
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> tokio::process::Command {
        tokio::process::Command::new(&self.binary)
    }
}

impl Default for PodmanEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `podman rmi`
fn rmi_args(image: &str, force: bool) -> Vec<&str> {
    let mut args = vec!["rmi"];
    if force {
        args.push("-f");
    }
    args.push(image);
    args
}

#[async_trait]
impl ContainerEngine for PodmanEngine {
    async fn image_exists(&self, image: &str) -> bool {
        match self
            .command()
            .args(["image", "exists", image])
            .output()
            .await
        {
            Ok(output) => {
                debug!(
                    "podman image exists {} -> {:?}",
                    image,
                    output.status.code()
                );
                output.status.success()
            }
            Err(e) => {
                debug!("Failed to inspect image {}: {}", image, e);
                false
            }
        }
    }

    async fn delete_image(&self, image: &str, force: bool) -> Result<()> {
        info!("Deleting image {} (force: {})", image, force);

        let output = self
            .command()
            .args(rmi_args(image, force))
            .output()
            .await
            .context("Failed to execute podman rmi command")?;

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);

            let error_msg = format!(
                "Failed to delete image {}: exit_code={}, stderr='{}'",
                image,
                exit_code,
                stderr.trim()
            );

            error!("{}", error_msg);
            anyhow::bail!("{}", error_msg);
        }

        debug!("Image {} deleted", image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmi_args() {
        assert_eq!(rmi_args("alpine:latest", false), vec!["rmi", "alpine:latest"]);
        assert_eq!(
            rmi_args("alpine:latest", true),
            vec!["rmi", "-f", "alpine:latest"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_reports_absent_image() {
        let engine = PodmanEngine::with_binary("keel-test-no-such-binary");
        assert!(!engine.image_exists("alpine:latest").await);
        assert!(engine.delete_image("alpine:latest", true).await.is_err());
    }
}
