//! Provider manager
//!
//! Providers are pluggable backends that carry out workspace and target
//! lifecycle operations on some infrastructure. The runner owns a single
//! [`ProviderManager`] created during startup and shared as an `Arc` with
//! every component that needs it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use keel_core::conversion::{Conversion, Convert};
use keel_core::domain::git_provider::GitProviderConfig;
use keel_core::domain::job::JobAction;
use keel_core::domain::runner::ProviderInfo;
use keel_core::domain::target::{Target, TargetConfig};
use keel_core::domain::workspace::Workspace;
use keel_core::dto::target::AddTargetConfigDto;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::repository::{RunnerRepository, TargetRepository};

/// Work handed to a provider
#[derive(Debug, Clone)]
pub enum ProviderRequest {
    Workspace {
        action: JobAction,
        workspace: Workspace,
        target: Target,
        /// Global variables merged with the workspace's own
        env_vars: HashMap<String, String>,
        git_provider_config: Option<GitProviderConfig>,
        /// Image used when the workspace does not name one
        builder_image: String,
    },
    Target {
        action: JobAction,
        target: Target,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    /// Opaque metadata to store with the resource
    pub metadata: Option<String>,
}

/// A provider plugin
#[async_trait]
pub trait Provider: Send + Sync {
    fn info(&self) -> ProviderInfo;

    async fn handle(&self, request: ProviderRequest) -> Result<ProviderResponse>;
}

/// Settings providers are started with
#[derive(Debug, Clone, Default)]
pub struct ProviderManagerConfig {
    pub logs_dir: PathBuf,
    /// API URL reachable from provider-created resources
    pub api_url: String,
    pub api_key: String,
    pub runner_id: String,
    pub runner_name: String,
    /// Where provider-created resources download the agent binary from
    pub download_url: String,
    /// Network coordination server
    pub server_url: String,
    pub base_dir: PathBuf,
    pub server_port: u32,
    pub api_port: u32,
}

/// Control-plane operations the provider manager relies on
#[async_trait]
pub trait ProviderManagerApi: Send + Sync {
    async fn create_provider_network_key(&self, provider_name: &str) -> Result<String>;

    /// Target configs keyed by name
    async fn target_config_map(&self) -> Result<HashMap<String, TargetConfig>>;

    async fn create_target_config(
        &self,
        name: &str,
        options: &str,
        provider_info: &ProviderInfo,
    ) -> Result<()>;
}

/// [`ProviderManagerApi`] backed by the control-plane API
pub struct RemoteProviderManagerApi<A> {
    api: Arc<A>,
}

impl<A> RemoteProviderManagerApi<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A> ProviderManagerApi for RemoteProviderManagerApi<A>
where
    A: RunnerRepository + TargetRepository,
{
    async fn create_provider_network_key(&self, provider_name: &str) -> Result<String> {
        debug!("Generating network key for provider {}", provider_name);
        let key = self.api.generate_network_key().await?;
        Ok(key.key)
    }

    async fn target_config_map(&self) -> Result<HashMap<String, TargetConfig>> {
        let list = self.api.list_target_configs().await?;

        let mut target_configs = HashMap::new();
        for dto in &list {
            if let Conversion::Value(config) = dto.convert()? {
                target_configs.insert(dto.name.clone(), config);
            }
        }

        Ok(target_configs)
    }

    async fn create_target_config(
        &self,
        name: &str,
        options: &str,
        provider_info: &ProviderInfo,
    ) -> Result<()> {
        let Conversion::Value(provider_info) = provider_info.convert()? else {
            anyhow::bail!("invalid provider info");
        };

        self.api
            .add_target_config(&AddTargetConfigDto {
                name: name.to_string(),
                options: options.to_string(),
                provider_info,
            })
            .await?;

        Ok(())
    }
}

/// Registry of the providers installed on this runner
pub struct ProviderManager {
    config: ProviderManagerConfig,
    api: Arc<dyn ProviderManagerApi>,
    providers: RwLock<BTreeMap<String, Arc<dyn Provider>>>,
}

impl ProviderManager {
    pub fn new(config: ProviderManagerConfig, api: Arc<dyn ProviderManagerApi>) -> Self {
        Self {
            config,
            api,
            providers: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &ProviderManagerConfig {
        &self.config
    }

    /// Registers a provider, replacing any provider with the same name
    pub async fn register(&self, provider: Arc<dyn Provider>) {
        let info = provider.info();
        info!("Registering provider {} {}", info.name, info.version);
        self.providers.write().await.insert(info.name, provider);
    }

    pub async fn unregister(&self, name: &str) -> Option<Arc<dyn Provider>> {
        let removed = self.providers.write().await.remove(name);
        if removed.is_some() {
            info!("Unregistered provider {}", name);
        }
        removed
    }

    pub async fn get_provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.read().await.get(name).cloned()
    }

    /// Identity of every registered provider, ordered by name
    pub async fn providers_info(&self) -> Vec<ProviderInfo> {
        self.providers
            .read()
            .await
            .values()
            .map(|provider| provider.info())
            .collect()
    }

    pub async fn network_key(&self, provider_name: &str) -> Result<String> {
        self.api
            .create_provider_network_key(provider_name)
            .await
            .with_context(|| format!("Failed to create network key for {}", provider_name))
    }

    pub async fn target_configs(&self) -> Result<HashMap<String, TargetConfig>> {
        self.api.target_config_map().await
    }

    pub async fn create_target_config(
        &self,
        name: &str,
        options: &str,
        provider_info: &ProviderInfo,
    ) -> Result<()> {
        self.api
            .create_target_config(name, options, provider_info)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, FakeProvider, provider_info};
    use keel_core::dto::runner::ProviderInfoDto;
    use keel_core::dto::target::TargetConfigDto;

    fn manager(api: &Arc<FakeApi>) -> ProviderManager {
        ProviderManager::new(
            ProviderManagerConfig::default(),
            Arc::new(RemoteProviderManagerApi::new(Arc::clone(api))),
        )
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let api = Arc::new(FakeApi::default());
        let manager = manager(&api);

        manager.register(FakeProvider::shared("podman-provider")).await;
        manager.register(FakeProvider::shared("aws-provider")).await;

        assert!(manager.get_provider("podman-provider").await.is_some());
        assert!(manager.get_provider("gcp-provider").await.is_none());

        let names: Vec<String> = manager
            .providers_info()
            .await
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(names, vec!["aws-provider", "podman-provider"]);

        assert!(manager.unregister("aws-provider").await.is_some());
        assert!(manager.unregister("aws-provider").await.is_none());
        assert_eq!(manager.providers_info().await.len(), 1);
    }

    #[tokio::test]
    async fn test_network_key_comes_from_api() {
        let api = Arc::new(FakeApi::default());
        api.set_network_key("nk-123");

        assert_eq!(manager(&api).network_key("podman-provider").await.unwrap(), "nk-123");
    }

    #[tokio::test]
    async fn test_target_config_map_skips_empty_records() {
        let api = Arc::new(FakeApi::default());
        api.set_target_configs(vec![
            TargetConfigDto {
                id: "tc1".to_string(),
                name: "local".to_string(),
                provider_info: ProviderInfoDto {
                    name: "podman-provider".to_string(),
                    version: "v1".to_string(),
                    ..Default::default()
                },
                options: "{}".to_string(),
                deleted: false,
            },
            TargetConfigDto::default(),
        ]);

        let configs = manager(&api).target_configs().await.unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs["local"].provider_info.name, "podman-provider");
    }

    #[tokio::test]
    async fn test_create_target_config_sends_converted_info() {
        let api = Arc::new(FakeApi::default());

        manager(&api)
            .create_target_config("local", "{}", &provider_info("podman-provider"))
            .await
            .unwrap();

        let added = api.added_target_configs();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].name, "local");
        assert_eq!(added[0].provider_info.name, "podman-provider");
    }

    #[tokio::test]
    async fn test_create_target_config_rejects_empty_provider_info() {
        let api = Arc::new(FakeApi::default());

        let err = manager(&api)
            .create_target_config("local", "{}", &ProviderInfo::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid provider info");
        assert!(api.added_target_configs().is_empty());
    }
}
