//! Repository layer
//!
//! Repositories abstract communication with the control plane. They provide
//! small, focused interfaces per resource kind without any business logic,
//! and are all implemented by [`keel_client::ApiClient`].
//!
//! All repositories are trait-based to enable testing and mocking.

mod builds;
mod env_vars;
mod git_providers;
mod jobs;
mod logs;
mod runners;
mod targets;
mod workspaces;

// Re-export traits
pub use builds::BuildRepository;
pub use env_vars::EnvVarRepository;
pub use git_providers::GitProviderRepository;
pub use jobs::JobRepository;
pub use logs::LogRepository;
pub use runners::RunnerRepository;
pub use targets::TargetRepository;
pub use workspaces::WorkspaceRepository;

/// Every control-plane operation the runner consumes
pub trait RemoteApi:
    JobRepository
    + LogRepository
    + RunnerRepository
    + WorkspaceRepository
    + TargetRepository
    + BuildRepository
    + GitProviderRepository
    + EnvVarRepository
    + 'static
{
}

impl<T> RemoteApi for T where
    T: JobRepository
        + LogRepository
        + RunnerRepository
        + WorkspaceRepository
        + TargetRepository
        + BuildRepository
        + GitProviderRepository
        + EnvVarRepository
        + 'static
{
}
