//! Runner configuration
//!
//! Defines all configurable parameters for the runner including its identity,
//! the control-plane connection, local directories and polling intervals.

use std::path::PathBuf;
use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Unique identifier for this runner instance
    pub id: String,

    /// Human-readable runner name
    pub name: String,

    /// Control-plane API base URL (e.g., "http://localhost:3986")
    pub server_api_url: String,

    /// API key the runner authenticates with
    pub server_api_key: String,

    /// Directory holding logs and build artifacts
    pub config_dir: PathBuf,

    /// Directory providers are installed into
    pub providers_dir: PathBuf,

    /// How often to poll the control plane for new jobs
    pub poll_interval: Duration,

    /// How often to push runner metadata
    pub metadata_interval: Duration,

    /// Max parallel jobs the runner can handle
    pub max_parallel_jobs: usize,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(id: String, server_api_url: String, server_api_key: String) -> Self {
        let config_dir = default_config_dir();
        Self {
            name: id.clone(),
            id,
            server_api_url,
            server_api_key,
            providers_dir: config_dir.join("providers"),
            config_dir,
            poll_interval: Duration::from_secs(2),
            metadata_interval: Duration::from_secs(10),
            max_parallel_jobs: 4,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - KEEL_RUNNER_ID (required)
    /// - KEEL_SERVER_API_URL (required)
    /// - KEEL_SERVER_API_KEY (required)
    /// - KEEL_RUNNER_NAME (optional, default: runner id)
    /// - KEEL_CONFIG_DIR (optional, default: <user config dir>/keel)
    /// - KEEL_PROVIDERS_DIR (optional, default: <config dir>/providers)
    /// - POLL_INTERVAL (optional, seconds, default: 2)
    /// - METADATA_INTERVAL (optional, seconds, default: 10)
    /// - MAX_PARALLEL_JOBS (optional, default: 4)
    pub fn from_env() -> anyhow::Result<Self> {
        let id = std::env::var("KEEL_RUNNER_ID")
            .map_err(|_| anyhow::anyhow!("KEEL_RUNNER_ID environment variable not set"))?;

        let server_api_url = std::env::var("KEEL_SERVER_API_URL")
            .map_err(|_| anyhow::anyhow!("KEEL_SERVER_API_URL environment variable not set"))?;

        let server_api_key = std::env::var("KEEL_SERVER_API_KEY")
            .map_err(|_| anyhow::anyhow!("KEEL_SERVER_API_KEY environment variable not set"))?;

        let mut config = Self::new(id, server_api_url, server_api_key);

        if let Ok(name) = std::env::var("KEEL_RUNNER_NAME") {
            config.name = name;
        }

        if let Ok(dir) = std::env::var("KEEL_CONFIG_DIR") {
            config.config_dir = PathBuf::from(dir);
            config.providers_dir = config.config_dir.join("providers");
        }

        if let Ok(dir) = std::env::var("KEEL_PROVIDERS_DIR") {
            config.providers_dir = PathBuf::from(dir);
        }

        config.poll_interval = std::env::var("POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.poll_interval);

        config.metadata_interval = std::env::var("METADATA_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.metadata_interval);

        config.max_parallel_jobs = std::env::var("MAX_PARALLEL_JOBS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(config.max_parallel_jobs);

        Ok(config)
    }

    /// Directory target and workspace logs are written to
    pub fn target_logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs").join("targets")
    }

    /// Directory build logs are written to
    pub fn build_logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs").join("builds")
    }

    /// Base directory for build artifacts
    pub fn builds_dir(&self) -> PathBuf {
        self.config_dir.join("builds")
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() {
            anyhow::bail!("runner id cannot be empty");
        }

        if self.server_api_key.is_empty() {
            anyhow::bail!("server_api_key cannot be empty");
        }

        if !self.server_api_url.starts_with("http://")
            && !self.server_api_url.starts_with("https://")
        {
            anyhow::bail!("server_api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.metadata_interval.is_zero() {
            anyhow::bail!("metadata_interval must be greater than 0");
        }

        if self.max_parallel_jobs == 0 {
            anyhow::bail!("max_parallel_jobs must be greater than 0");
        }

        Ok(())
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keel")
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "http://localhost:3986".to_string(),
            "local-runner-key".to_string(),
        )
    }
}
