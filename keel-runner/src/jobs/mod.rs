//! Job factories
//!
//! Turns job records from the queue into executable jobs. Each resource
//! kind has a factory holding the capability bundle, logger factory and
//! provider manager its jobs need; [`JobFactories`] routes a job to the
//! factory for its resource type.

mod build;
mod capabilities;
mod runner;
mod target;
mod workspace;

use anyhow::Result;
use async_trait::async_trait;
use keel_core::domain::job::{Job, ResourceType};
use std::sync::Arc;

// Re-export traits
pub use capabilities::{
    BuildJobCapabilities, RunnerJobCapabilities, TargetJobCapabilities, WorkspaceJobCapabilities,
};

// Re-export implementations
pub use build::BuildJobFactory;
pub use capabilities::{
    RemoteBuildCapabilities, RemoteRunnerCapabilities, RemoteTargetCapabilities,
    RemoteWorkspaceCapabilities,
};
pub use runner::RunnerJobFactory;
pub use target::TargetJobFactory;
pub use workspace::WorkspaceJobFactory;

/// A job ready to run
#[async_trait]
pub trait ExecutableJob: Send + Sync {
    fn job(&self) -> &Job;

    async fn execute(&self) -> Result<()>;
}

/// Creates executable jobs for one resource type
pub trait JobFactory: Send + Sync {
    fn create(&self, job: Job) -> Box<dyn ExecutableJob>;
}

/// One factory per resource type
#[derive(Clone)]
pub struct JobFactories {
    pub workspace: Arc<dyn JobFactory>,
    pub target: Arc<dyn JobFactory>,
    pub build: Arc<dyn JobFactory>,
    pub runner: Arc<dyn JobFactory>,
}

impl JobFactories {
    pub fn factory_for(&self, resource_type: ResourceType) -> &Arc<dyn JobFactory> {
        match resource_type {
            ResourceType::Workspace => &self.workspace,
            ResourceType::Target => &self.target,
            ResourceType::Build => &self.build,
            ResourceType::Runner => &self.runner,
        }
    }

    pub fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
        self.factory_for(job.resource_type).create(job)
    }
}

/// Unsupported action for a resource type
fn unsupported(job: &Job) -> anyhow::Error {
    anyhow::anyhow!(
        "action {} is not supported for {} jobs",
        job.action,
        job.resource_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::job;
    use keel_core::domain::job::JobAction;
    use std::sync::Mutex;

    /// Factory whose jobs record which factory created them
    struct TaggingFactory {
        tag: &'static str,
        created: Arc<Mutex<Vec<(&'static str, String)>>>,
    }

    struct TaggedJob {
        job: Job,
    }

    #[async_trait]
    impl ExecutableJob for TaggedJob {
        fn job(&self) -> &Job {
            &self.job
        }

        async fn execute(&self) -> Result<()> {
            Ok(())
        }
    }

    impl JobFactory for TaggingFactory {
        fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
            self.created.lock().unwrap().push((self.tag, job.id.clone()));
            Box::new(TaggedJob { job })
        }
    }

    fn factories(created: &Arc<Mutex<Vec<(&'static str, String)>>>) -> JobFactories {
        let factory = |tag| -> Arc<dyn JobFactory> {
            Arc::new(TaggingFactory {
                tag,
                created: Arc::clone(created),
            })
        };
        JobFactories {
            workspace: factory("workspace"),
            target: factory("target"),
            build: factory("build"),
            runner: factory("runner"),
        }
    }

    #[test]
    fn test_routes_by_resource_type() {
        let created = Arc::new(Mutex::new(Vec::new()));
        let factories = factories(&created);

        for (id, resource_type) in [
            ("j1", ResourceType::Build),
            ("j2", ResourceType::Workspace),
            ("j3", ResourceType::Runner),
            ("j4", ResourceType::Target),
        ] {
            let executable = factories.create(job(id, resource_type, JobAction::Create, "r1"));
            assert_eq!(executable.job().id, id);
        }

        assert_eq!(
            *created.lock().unwrap(),
            vec![
                ("build", "j1".to_string()),
                ("workspace", "j2".to_string()),
                ("runner", "j3".to_string()),
                ("target", "j4".to_string()),
            ]
        );
    }

    #[test]
    fn test_unsupported_message() {
        let job = job("j1", ResourceType::Build, JobAction::Start, "b1");
        assert_eq!(
            unsupported(&job).to_string(),
            "action start is not supported for build jobs"
        );
    }
}
