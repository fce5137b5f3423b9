//! Build jobs
//!
//! A `build` action produces the image named by the builder factory unless
//! the container engine already has it. `delete` and `force-delete` remove
//! the image from the local store.

use anyhow::Result;
use async_trait::async_trait;
use keel_core::domain::build::BuildRecord;
use keel_core::domain::job::{Job, JobAction};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::{BuildJobCapabilities, ExecutableJob, JobFactory, unsupported};
use crate::builder::{BuildRequest, BuilderFactory};
use crate::logs::{JobLogger, LoggerFactory};
use crate::telemetry::BuildRunnerEvent;

pub struct BuildJobFactory {
    capabilities: Arc<dyn BuildJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    builder_factory: Arc<BuilderFactory>,
    base_path: PathBuf,
}

impl BuildJobFactory {
    pub fn new(
        capabilities: Arc<dyn BuildJobCapabilities>,
        logger_factory: Arc<LoggerFactory>,
        builder_factory: Arc<BuilderFactory>,
        base_path: PathBuf,
    ) -> Self {
        Self {
            capabilities,
            logger_factory,
            builder_factory,
            base_path,
        }
    }

    pub fn builder_factory(&self) -> &BuilderFactory {
        &self.builder_factory
    }

    /// Directory builds keep their artifacts under
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl JobFactory for BuildJobFactory {
    fn create(&self, job: Job) -> Box<dyn ExecutableJob> {
        Box::new(BuildJob {
            job,
            capabilities: Arc::clone(&self.capabilities),
            logger_factory: Arc::clone(&self.logger_factory),
            builder_factory: Arc::clone(&self.builder_factory),
            base_path: self.base_path.clone(),
        })
    }
}

struct BuildJob {
    job: Job,
    capabilities: Arc<dyn BuildJobCapabilities>,
    logger_factory: Arc<LoggerFactory>,
    builder_factory: Arc<BuilderFactory>,
    base_path: PathBuf,
}

/// What a successful run did
enum Outcome {
    Built,
    Skipped,
    Deleted,
}

impl BuildJob {
    async fn build(&self, record: BuildRecord, logger: &JobLogger) -> Result<Outcome> {
        let build = record.build;
        let image = self.builder_factory.image_name(&build.id);

        if self.capabilities.check_image_exists(&image).await {
            logger.info(format!("Image {} already exists, skipping build", image));
            return Ok(Outcome::Skipped);
        }

        let Some(image_builder) = self.builder_factory.image_builder() else {
            anyhow::bail!("no image builder is configured to build {}", image);
        };

        let repo_url = build.repository.url.clone();
        let cache_from = self
            .capabilities
            .list_successful_builds(&repo_url)
            .await?
            .into_iter()
            .filter_map(|previous| previous.image)
            .collect();
        let git_provider_configs = self.capabilities.list_configs_for_url(&repo_url).await?;

        let config = self.builder_factory.config();
        logger.info(format!("Building {} from {}", image, repo_url));

        image_builder
            .build(BuildRequest {
                work_dir: self.base_path.join(&build.id),
                build,
                image,
                builder_image: config.image.clone(),
                registry: config.build_image_container_registry.clone(),
                container_registries: config.container_registries.clone(),
                default_workspace_image: config.default_workspace_image.clone(),
                default_workspace_user: config.default_workspace_user.clone(),
                cache_from,
                git_provider_configs,
                logger,
            })
            .await?;

        Ok(Outcome::Built)
    }

    async fn delete(&self, record: BuildRecord, force: bool, logger: &JobLogger) -> Result<Outcome> {
        let image = record
            .build
            .image
            .unwrap_or_else(|| self.builder_factory.image_name(&record.build.id));

        logger.info(format!("Deleting image {}", image));
        self.capabilities.delete_image(&image, force).await?;

        Ok(Outcome::Deleted)
    }

    async fn run(&self, logger: &JobLogger) -> Result<Outcome> {
        let record = self.capabilities.find_build(&self.job.resource_id).await?;

        match self.job.action {
            JobAction::Build => self.build(record, logger).await,
            JobAction::Delete => self.delete(record, false, logger).await,
            JobAction::ForceDelete => self.delete(record, true, logger).await,
            _ => Err(unsupported(&self.job)),
        }
    }
}

#[async_trait]
impl ExecutableJob for BuildJob {
    fn job(&self) -> &Job {
        &self.job
    }

    async fn execute(&self) -> Result<()> {
        info!(
            "Executing build job {} ({} {})",
            self.job.id, self.job.action, self.job.resource_id
        );

        let logger = self.logger_factory.build_logger(&self.job.resource_id);
        let result = self.run(&logger).await;

        let props = json!({ "build_id": self.job.resource_id });
        let event = match &result {
            Ok(Outcome::Built) => BuildRunnerEvent::BuildCompleted,
            Ok(Outcome::Skipped) => BuildRunnerEvent::BuildSkipped,
            Ok(Outcome::Deleted) => BuildRunnerEvent::BuildDeleted,
            Err(e) => {
                logger.error(format!("{:#}", e));
                BuildRunnerEvent::BuildFailed
            }
        };
        logger.close().await;
        if let Err(e) = self.capabilities.track_event(event, props) {
            warn!("Failed to track telemetry event: {:#}", e);
        }

        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderFactoryConfig, ImageBuilder};
    use crate::jobs::RemoteBuildCapabilities;
    use crate::testing::{
        FakeApi, FakeEngine, RecordingTelemetry, build_dto, job,
    };
    use keel_core::domain::job::ResourceType;
    use keel_core::domain::registry::ContainerRegistry;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBuilder {
        built: Mutex<Vec<(String, Vec<String>, PathBuf)>>,
    }

    #[async_trait]
    impl ImageBuilder for RecordingBuilder {
        async fn build(&self, request: BuildRequest<'_>) -> Result<()> {
            self.built.lock().unwrap().push((
                request.image,
                request.cache_from,
                request.work_dir,
            ));
            Ok(())
        }
    }

    struct Fixture {
        api: Arc<FakeApi>,
        engine: Arc<FakeEngine>,
        builder: Arc<RecordingBuilder>,
        factory: BuildJobFactory,
    }

    fn fixture(images: &[&str]) -> Fixture {
        let api = Arc::new(FakeApi::default());
        let engine = Arc::new(FakeEngine::with_images(images));
        let builder = Arc::new(RecordingBuilder::default());

        let builder_factory = BuilderFactory::new(
            BuilderFactoryConfig {
                image: "keel/builder:latest".to_string(),
                build_image_container_registry: ContainerRegistry::from_server("ghcr.io"),
                build_image_namespace: "/acme".to_string(),
                ..Default::default()
            },
            Some(Arc::clone(&builder) as Arc<dyn ImageBuilder>),
        );

        let factory = BuildJobFactory::new(
            Arc::new(RemoteBuildCapabilities::new(
                Arc::clone(&api),
                Arc::clone(&engine) as _,
                Arc::new(RecordingTelemetry::default()),
                "runner-1".to_string(),
            )),
            Arc::new(LoggerFactory::default()),
            Arc::new(builder_factory),
            PathBuf::from("/var/lib/keel/builds"),
        );

        Fixture {
            api,
            engine,
            builder,
            factory,
        }
    }

    #[tokio::test]
    async fn test_existing_image_skips_build() {
        let fixture = fixture(&["ghcr.io/acme/b-b1:latest"]);
        fixture.api.insert_build(build_dto("b1", "pending-run"));

        fixture
            .factory
            .create(job("j1", ResourceType::Build, JobAction::Build, "b1"))
            .execute()
            .await
            .unwrap();

        assert!(fixture.builder.built.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_image_is_built_with_cache() {
        let fixture = fixture(&[]);
        fixture.api.insert_build(build_dto("b2", "pending-run"));
        let mut previous = build_dto("b1", "success");
        previous.image = Some("ghcr.io/acme/b-b1:latest".to_string());
        fixture.api.set_successful_builds(vec![previous]);

        fixture
            .factory
            .create(job("j1", ResourceType::Build, JobAction::Build, "b2"))
            .execute()
            .await
            .unwrap();

        let built = fixture.builder.built.lock().unwrap();
        assert_eq!(
            *built,
            vec![(
                "ghcr.io/acme/b-b2:latest".to_string(),
                vec!["ghcr.io/acme/b-b1:latest".to_string()],
                PathBuf::from("/var/lib/keel/builds/b2"),
            )]
        );
    }

    #[tokio::test]
    async fn test_force_delete_removes_recorded_image() {
        let fixture = fixture(&[]);
        let mut dto = build_dto("b1", "pending-forced-delete");
        dto.image = Some("registry.local/custom:1".to_string());
        fixture.api.insert_build(dto);

        fixture
            .factory
            .create(job("j1", ResourceType::Build, JobAction::ForceDelete, "b1"))
            .execute()
            .await
            .unwrap();

        assert_eq!(
            fixture.engine.deleted(),
            vec![("registry.local/custom:1".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_delete_falls_back_to_computed_image() {
        let fixture = fixture(&[]);
        fixture.api.insert_build(build_dto("b1", "pending-delete"));

        fixture
            .factory
            .create(job("j1", ResourceType::Build, JobAction::Delete, "b1"))
            .execute()
            .await
            .unwrap();

        assert_eq!(
            fixture.engine.deleted(),
            vec![("ghcr.io/acme/b-b1:latest".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_start_is_unsupported() {
        let fixture = fixture(&[]);
        fixture.api.insert_build(build_dto("b1", "pending-run"));

        let result = fixture
            .factory
            .create(job("j1", ResourceType::Build, JobAction::Start, "b1"))
            .execute()
            .await;

        assert!(result.is_err());
    }
}
