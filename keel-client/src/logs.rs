//! Job log endpoints

use crate::error::Result;
use crate::{ApiClient, segment};
use keel_core::domain::log::{LogEntry, LogSource};

impl ApiClient {
    /// Append entries to the log the control plane keeps for a resource
    ///
    /// # Arguments
    /// * `source` - Kind of resource the log belongs to
    /// * `resource_id` - The workspace, target or build ID
    /// * `entries` - Entries in the order they were written
    pub async fn write_logs(
        &self,
        source: LogSource,
        resource_id: &str,
        entries: &[LogEntry],
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let response = self
            .post(&format!(
                "/log/{}/{}/write",
                source.as_str(),
                segment(resource_id)
            ))
            .json(entries)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
