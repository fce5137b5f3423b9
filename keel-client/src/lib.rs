//! Keel HTTP Client
//!
//! A type-safe HTTP client for the Keel control-plane API as used by runners.
//!
//! Every method performs exactly one request and never retries; retry policy
//! belongs to the caller. Requests are cancelled by dropping the returned
//! future.
//!
//! # Example
//!
//! ```no_run
//! use keel_client::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("https://keel.example.com/api", "runner-api-key");
//!
//!     let (jobs, status) = client.list_runner_jobs("runner-1").await?;
//!     println!("{} pending job(s), status {}", jobs.len(), status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod builds;
mod env_vars;
mod git_providers;
mod jobs;
mod logs;
mod runners;
mod targets;
mod workspaces;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

/// HTTP client for the Keel control-plane API
///
/// Methods are organized into logical groups:
/// - Runner jobs (list, state updates) and runner metadata
/// - Workspaces, targets and target configs
/// - Builds and git providers
/// - Environment variables and server configuration
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API (e.g., "http://localhost:3986")
    base_url: String,
    /// Key sent as a bearer token on every request
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:3986")
    /// * `api_key` - The runner API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use keel_client::ApiClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ApiClient::with_client("http://localhost:3986", "key", http_client);
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.api_key)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.api_key)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(&self.api_key)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON, keeping the status code
    async fn handle_response_with_status<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<(T, u16)> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), "API request failed: {}", error_text);
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError {
                status: status.as_u16(),
                message: format!("Failed to parse JSON response: {}", e),
            })?;

        Ok((body, status.as_u16()))
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        self.handle_response_with_status(response)
            .await
            .map(|(body, _)| body)
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

/// Percent-encodes `value` as a single URL path segment
///
/// Everything but ASCII alphanumerics and `*-._` is encoded, including `/`
/// and `%`, so an already escaped value is escaped again.
pub(crate) fn segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
