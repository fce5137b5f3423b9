//! Telemetry events
//!
//! Job glue reports lifecycle events through [`TelemetryService`]. The runner
//! ships a tracing-backed implementation; anything forwarding events to an
//! analytics backend plugs in behind the same trait.

use anyhow::Result;
use serde_json::Value;
use tracing::info;

/// Events about resources managed by the server (workspaces, targets)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    WorkspaceCreated,
    WorkspaceStarted,
    WorkspaceStopped,
    WorkspaceRestarted,
    WorkspaceDestroyed,
    WorkspaceJobFailed,
    TargetCreated,
    TargetStarted,
    TargetStopped,
    TargetRestarted,
    TargetDestroyed,
    TargetJobFailed,
}

/// Events about image builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildRunnerEvent {
    BuildCompleted,
    BuildSkipped,
    BuildDeleted,
    BuildFailed,
}

/// Events about the runner itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    ProviderInstalled,
    ProviderUninstalled,
    ProviderUpdated,
    ProviderJobFailed,
}

impl ServerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerEvent::WorkspaceCreated => "workspace_created",
            ServerEvent::WorkspaceStarted => "workspace_started",
            ServerEvent::WorkspaceStopped => "workspace_stopped",
            ServerEvent::WorkspaceRestarted => "workspace_restarted",
            ServerEvent::WorkspaceDestroyed => "workspace_destroyed",
            ServerEvent::WorkspaceJobFailed => "workspace_job_failed",
            ServerEvent::TargetCreated => "target_created",
            ServerEvent::TargetStarted => "target_started",
            ServerEvent::TargetStopped => "target_stopped",
            ServerEvent::TargetRestarted => "target_restarted",
            ServerEvent::TargetDestroyed => "target_destroyed",
            ServerEvent::TargetJobFailed => "target_job_failed",
        }
    }
}

impl BuildRunnerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildRunnerEvent::BuildCompleted => "build_completed",
            BuildRunnerEvent::BuildSkipped => "build_skipped",
            BuildRunnerEvent::BuildDeleted => "build_deleted",
            BuildRunnerEvent::BuildFailed => "build_failed",
        }
    }
}

impl RunnerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerEvent::ProviderInstalled => "provider_installed",
            RunnerEvent::ProviderUninstalled => "provider_uninstalled",
            RunnerEvent::ProviderUpdated => "provider_updated",
            RunnerEvent::ProviderJobFailed => "provider_job_failed",
        }
    }
}

/// Sink for telemetry events
///
/// `props` is a JSON object with event-specific properties.
pub trait TelemetryService: Send + Sync {
    fn track_server_event(&self, event: ServerEvent, client_id: &str, props: Value) -> Result<()>;

    fn track_build_runner_event(
        &self,
        event: BuildRunnerEvent,
        client_id: &str,
        props: Value,
    ) -> Result<()>;

    fn track_runner_event(&self, event: RunnerEvent, client_id: &str, props: Value) -> Result<()>;
}

/// Emits every event as a structured tracing record
#[derive(Debug, Default, Clone)]
pub struct LoggingTelemetryService;

impl LoggingTelemetryService {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryService for LoggingTelemetryService {
    fn track_server_event(&self, event: ServerEvent, client_id: &str, props: Value) -> Result<()> {
        info!(target: "telemetry", event = event.as_str(), client_id, %props, "server event");
        Ok(())
    }

    fn track_build_runner_event(
        &self,
        event: BuildRunnerEvent,
        client_id: &str,
        props: Value,
    ) -> Result<()> {
        info!(target: "telemetry", event = event.as_str(), client_id, %props, "build runner event");
        Ok(())
    }

    fn track_runner_event(&self, event: RunnerEvent, client_id: &str, props: Value) -> Result<()> {
        info!(target: "telemetry", event = event.as_str(), client_id, %props, "runner event");
        Ok(())
    }
}
