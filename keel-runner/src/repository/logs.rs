//! Logs repository
//!
//! Sends job log entries to the control plane. This is a stateless client;
//! batching is handled by the job loggers.

use async_trait::async_trait;
use keel_client::{ApiClient, Result};
use keel_core::domain::log::{LogEntry, LogSource};

/// Repository trait for job log forwarding
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Appends entries to the remote log of a resource
    ///
    /// # Arguments
    /// * `source` - Kind of resource the log belongs to
    /// * `resource_id` - The resource the entries were written for
    /// * `entries` - The entries to send, oldest first
    async fn write_logs(
        &self,
        source: LogSource,
        resource_id: &str,
        entries: &[LogEntry],
    ) -> Result<()>;
}

#[async_trait]
impl LogRepository for ApiClient {
    async fn write_logs(
        &self,
        source: LogSource,
        resource_id: &str,
        entries: &[LogEntry],
    ) -> Result<()> {
        ApiClient::write_logs(self, source, resource_id, entries).await
    }
}
