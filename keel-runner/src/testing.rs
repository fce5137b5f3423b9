//! In-memory fakes shared by the unit tests

use anyhow::Result;
use async_trait::async_trait;
use keel_client::{ClientError, Result as ClientResult};
use keel_core::domain::job::{Job, JobAction, JobState, ResourceType};
use keel_core::domain::log::{LogEntry, LogSource};
use keel_core::domain::runner::ProviderInfo;
use keel_core::domain::server::ServerConfig;
use keel_core::dto::build::BuildDto;
use keel_core::dto::env::EnvironmentVariableDto;
use keel_core::dto::git_provider::GitProviderDto;
use keel_core::dto::job::{
    JobActionDto, JobDto, JobStateDto, ResourceTypeDto, UpdateJobStateDto, parse_job_listing,
};
use keel_core::dto::runner::{NetworkKeyDto, ProviderInfoDto, SetRunnerMetadataDto};
use keel_core::dto::server::{FrpsConfigDto, ServerConfigDto};
use keel_core::dto::target::{AddTargetConfigDto, TargetConfigDto, TargetDto};
use keel_core::dto::workspace::{GitRepositoryDto, UpdateProviderMetadataDto, WorkspaceDto};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::podman::ContainerEngine;
use crate::provider::{
    Provider, ProviderManager, ProviderManagerConfig, ProviderRequest, ProviderResponse,
    RemoteProviderManagerApi,
};
use crate::repository::{
    BuildRepository, EnvVarRepository, GitProviderRepository, JobRepository, LogRepository,
    RunnerRepository, TargetRepository, WorkspaceRepository,
};
use crate::telemetry::{BuildRunnerEvent, RunnerEvent, ServerEvent, TelemetryService};

/// Error raised before any response was received
fn transport_error() -> ClientError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    ClientError::RequestFailed(err)
}

fn failure(status: Option<u16>) -> ClientError {
    match status {
        Some(status) => ClientError::api_error(status, "injected failure"),
        None => transport_error(),
    }
}

fn not_found(kind: &str, id: &str) -> ClientError {
    ClientError::api_error(404, format!("{} {} not found", kind, id))
}

#[derive(Default)]
struct FakeState {
    jobs: Vec<JobDto>,
    job_listing_failure: Option<Option<u16>>,
    listed_runner_ids: Vec<String>,
    job_state_updates: Vec<(String, String, UpdateJobStateDto)>,
    log_batches: Vec<(LogSource, String, Vec<LogEntry>)>,
    log_write_failure: bool,
    runner_metadata: Vec<(String, SetRunnerMetadataDto)>,
    network_key: String,
    server_config: Option<ServerConfigDto>,
    server_config_failures: usize,
    workspaces: HashMap<String, WorkspaceDto>,
    workspace_metadata: Vec<(String, String)>,
    targets: HashMap<String, TargetDto>,
    target_metadata: Vec<(String, String)>,
    successful_creations: Vec<String>,
    target_configs: Vec<TargetConfigDto>,
    added_target_configs: Vec<AddTargetConfigDto>,
    builds: HashMap<String, BuildDto>,
    successful_builds: Vec<BuildDto>,
    git_providers: HashMap<String, GitProviderDto>,
    git_providers_for_url: Vec<GitProviderDto>,
    escaped_urls: Vec<String>,
    env_vars: Vec<EnvironmentVariableDto>,
    env_vars_failure: Option<Option<u16>>,
    env_var_fetches: usize,
}

/// Control-plane API backed by in-memory records
///
/// Every call is recorded; missing records answer with a 404.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_jobs(&self, jobs: Vec<JobDto>) {
        self.state().jobs = jobs;
    }

    /// Serves raw listing records, read the way the API client reads them
    pub fn set_job_records(&self, records: Vec<Value>) {
        self.state().jobs = parse_job_listing(records).0;
    }

    /// Makes job listing fail, with an HTTP status or before any response
    pub fn fail_job_listing(&self, status: Option<u16>) {
        self.state().job_listing_failure = Some(status);
    }

    pub fn listed_runner_ids(&self) -> Vec<String> {
        self.state().listed_runner_ids.clone()
    }

    pub fn job_state_updates(&self) -> Vec<(String, String, UpdateJobStateDto)> {
        self.state().job_state_updates.clone()
    }

    /// Log batches received, in arrival order
    pub fn log_batches(&self) -> Vec<(LogSource, String, Vec<LogEntry>)> {
        self.state().log_batches.clone()
    }

    /// Every forwarded log message for one resource, in order
    pub fn log_messages(&self, resource_id: &str) -> Vec<String> {
        self.state()
            .log_batches
            .iter()
            .filter(|(_, id, _)| id == resource_id)
            .flat_map(|(_, _, entries)| entries.iter().map(|entry| entry.message.clone()))
            .collect()
    }

    pub fn fail_log_writes(&self) {
        self.state().log_write_failure = true;
    }

    pub fn runner_metadata(&self) -> Vec<(String, SetRunnerMetadataDto)> {
        self.state().runner_metadata.clone()
    }

    pub fn set_network_key(&self, key: &str) {
        self.state().network_key = key.to_string();
    }

    pub fn set_server_config(&self, config: ServerConfigDto) {
        self.state().server_config = Some(config);
    }

    /// Fails the next `count` server config fetches
    pub fn fail_server_config(&self, count: usize) {
        self.state().server_config_failures = count;
    }

    pub fn insert_workspace(&self, workspace: WorkspaceDto) {
        self.state()
            .workspaces
            .insert(workspace.id.clone(), workspace);
    }

    pub fn workspace_metadata(&self) -> Vec<(String, String)> {
        self.state().workspace_metadata.clone()
    }

    pub fn insert_target(&self, target: TargetDto) {
        let id = target.id.clone();
        self.insert_target_as(&id, target);
    }

    /// Serves `target` for lookups of `id`, whatever its own id says
    pub fn insert_target_as(&self, id: &str, target: TargetDto) {
        self.state().targets.insert(id.to_string(), target);
    }

    pub fn target_metadata(&self) -> Vec<(String, String)> {
        self.state().target_metadata.clone()
    }

    pub fn successful_creations(&self) -> Vec<String> {
        self.state().successful_creations.clone()
    }

    pub fn set_target_configs(&self, configs: Vec<TargetConfigDto>) {
        self.state().target_configs = configs;
    }

    pub fn added_target_configs(&self) -> Vec<AddTargetConfigDto> {
        self.state().added_target_configs.clone()
    }

    pub fn insert_build(&self, build: BuildDto) {
        self.state().builds.insert(build.id.clone(), build);
    }

    pub fn set_successful_builds(&self, builds: Vec<BuildDto>) {
        self.state().successful_builds = builds;
    }

    pub fn insert_git_provider(&self, git_provider: GitProviderDto) {
        self.state()
            .git_providers
            .insert(git_provider.id.clone(), git_provider);
    }

    pub fn set_git_providers_for_url(&self, git_providers: Vec<GitProviderDto>) {
        self.state().git_providers_for_url = git_providers;
    }

    /// Repository URLs as received by the URL-scoped listings
    pub fn escaped_urls(&self) -> Vec<String> {
        self.state().escaped_urls.clone()
    }

    pub fn set_env_vars(&self, vars: Vec<EnvironmentVariableDto>) {
        self.state().env_vars = vars;
    }

    /// Makes the environment variable listing fail
    pub fn fail_env_vars(&self, status: Option<u16>) {
        self.state().env_vars_failure = Some(status);
    }

    pub fn env_var_fetches(&self) -> usize {
        self.state().env_var_fetches
    }
}

#[async_trait]
impl JobRepository for FakeApi {
    async fn list_runner_jobs(&self, runner_id: &str) -> ClientResult<(Vec<JobDto>, u16)> {
        let mut state = self.state();
        state.listed_runner_ids.push(runner_id.to_string());
        if let Some(status) = state.job_listing_failure {
            return Err(failure(status));
        }
        Ok((state.jobs.clone(), 200))
    }

    async fn update_job_state(
        &self,
        runner_id: &str,
        job_id: &str,
        update: &UpdateJobStateDto,
    ) -> ClientResult<()> {
        self.state().job_state_updates.push((
            runner_id.to_string(),
            job_id.to_string(),
            update.clone(),
        ));
        Ok(())
    }
}

#[async_trait]
impl LogRepository for FakeApi {
    async fn write_logs(
        &self,
        source: LogSource,
        resource_id: &str,
        entries: &[LogEntry],
    ) -> ClientResult<()> {
        let mut state = self.state();
        if state.log_write_failure {
            return Err(failure(Some(502)));
        }
        state
            .log_batches
            .push((source, resource_id.to_string(), entries.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl RunnerRepository for FakeApi {
    async fn set_runner_metadata(
        &self,
        runner_id: &str,
        metadata: &SetRunnerMetadataDto,
    ) -> ClientResult<()> {
        self.state()
            .runner_metadata
            .push((runner_id.to_string(), metadata.clone()));
        Ok(())
    }

    async fn generate_network_key(&self) -> ClientResult<NetworkKeyDto> {
        Ok(NetworkKeyDto {
            key: self.state().network_key.clone(),
        })
    }

    async fn get_server_config(&self) -> ClientResult<ServerConfigDto> {
        let mut state = self.state();
        if state.server_config_failures > 0 {
            state.server_config_failures -= 1;
            return Err(failure(Some(503)));
        }
        state
            .server_config
            .clone()
            .ok_or_else(|| not_found("server config", "default"))
    }
}

#[async_trait]
impl WorkspaceRepository for FakeApi {
    async fn get_workspace(&self, workspace_id: &str) -> ClientResult<WorkspaceDto> {
        self.state()
            .workspaces
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| not_found("workspace", workspace_id))
    }

    async fn update_workspace_provider_metadata(
        &self,
        workspace_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> ClientResult<()> {
        self.state()
            .workspace_metadata
            .push((workspace_id.to_string(), metadata.metadata.clone()));
        Ok(())
    }
}

#[async_trait]
impl TargetRepository for FakeApi {
    async fn get_target(&self, target_id: &str) -> ClientResult<TargetDto> {
        self.state()
            .targets
            .get(target_id)
            .cloned()
            .ok_or_else(|| not_found("target", target_id))
    }

    async fn handle_successful_creation(&self, target_id: &str) -> ClientResult<()> {
        self.state()
            .successful_creations
            .push(target_id.to_string());
        Ok(())
    }

    async fn update_target_provider_metadata(
        &self,
        target_id: &str,
        metadata: &UpdateProviderMetadataDto,
    ) -> ClientResult<()> {
        self.state()
            .target_metadata
            .push((target_id.to_string(), metadata.metadata.clone()));
        Ok(())
    }

    async fn list_target_configs(&self) -> ClientResult<Vec<TargetConfigDto>> {
        Ok(self.state().target_configs.clone())
    }

    async fn add_target_config(&self, config: &AddTargetConfigDto) -> ClientResult<TargetConfigDto> {
        self.state().added_target_configs.push(config.clone());
        Ok(TargetConfigDto {
            id: format!("tc-{}", config.name),
            name: config.name.clone(),
            provider_info: config.provider_info.clone(),
            options: config.options.clone(),
            deleted: false,
        })
    }
}

#[async_trait]
impl BuildRepository for FakeApi {
    async fn get_build(&self, build_id: &str) -> ClientResult<BuildDto> {
        self.state()
            .builds
            .get(build_id)
            .cloned()
            .ok_or_else(|| not_found("build", build_id))
    }

    async fn list_successful_builds(&self, escaped_repo_url: &str) -> ClientResult<Vec<BuildDto>> {
        let mut state = self.state();
        state.escaped_urls.push(escaped_repo_url.to_string());
        Ok(state.successful_builds.clone())
    }
}

#[async_trait]
impl GitProviderRepository for FakeApi {
    async fn get_git_provider(&self, id: &str) -> ClientResult<GitProviderDto> {
        self.state()
            .git_providers
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("git provider", id))
    }

    async fn list_git_providers_for_url(
        &self,
        escaped_repo_url: &str,
    ) -> ClientResult<Vec<GitProviderDto>> {
        let mut state = self.state();
        state.escaped_urls.push(escaped_repo_url.to_string());
        Ok(state.git_providers_for_url.clone())
    }
}

#[async_trait]
impl EnvVarRepository for FakeApi {
    async fn list_environment_variables(&self) -> ClientResult<Vec<EnvironmentVariableDto>> {
        let mut state = self.state();
        state.env_var_fetches += 1;
        if let Some(status) = state.env_vars_failure {
            return Err(failure(status));
        }
        Ok(state.env_vars.clone())
    }
}

/// Container engine with a fixed local image store
#[derive(Default)]
pub struct FakeEngine {
    images: Mutex<BTreeSet<String>>,
    deleted: Mutex<Vec<(String, bool)>>,
}

impl FakeEngine {
    pub fn with_images(images: &[&str]) -> Self {
        Self {
            images: Mutex::new(images.iter().map(|image| image.to_string()).collect()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn deleted(&self) -> Vec<(String, bool)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn image_exists(&self, image: &str) -> bool {
        self.images.lock().unwrap().contains(image)
    }

    async fn delete_image(&self, image: &str, force: bool) -> Result<()> {
        self.images.lock().unwrap().remove(image);
        self.deleted
            .lock()
            .unwrap()
            .push((image.to_string(), force));
        Ok(())
    }
}

/// Provider that records requests and answers with a canned response
pub struct FakeProvider {
    info: ProviderInfo,
    metadata: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl FakeProvider {
    pub fn new(name: &str) -> Self {
        Self {
            info: provider_info(name),
            metadata: Mutex::new(None),
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(name: &str) -> Arc<dyn Provider> {
        Arc::new(Self::new(name))
    }

    pub fn respond_with_metadata(&self, metadata: &str) {
        *self.metadata.lock().unwrap() = Some(metadata.to_string());
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }

    async fn handle(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(message) = self.failure.lock().unwrap().clone() {
            anyhow::bail!(message);
        }
        Ok(ProviderResponse {
            metadata: self.metadata.lock().unwrap().clone(),
        })
    }
}

/// Telemetry sink recording `(event, client id)` pairs
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: &str, client_id: &str) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), client_id.to_string()));
        Ok(())
    }
}

impl TelemetryService for RecordingTelemetry {
    fn track_server_event(&self, event: ServerEvent, client_id: &str, _props: Value) -> Result<()> {
        self.record(event.as_str(), client_id)
    }

    fn track_build_runner_event(
        &self,
        event: BuildRunnerEvent,
        client_id: &str,
        _props: Value,
    ) -> Result<()> {
        self.record(event.as_str(), client_id)
    }

    fn track_runner_event(&self, event: RunnerEvent, client_id: &str, _props: Value) -> Result<()> {
        self.record(event.as_str(), client_id)
    }
}

pub fn provider_manager(api: &Arc<FakeApi>) -> Arc<ProviderManager> {
    Arc::new(ProviderManager::new(
        ProviderManagerConfig::default(),
        Arc::new(RemoteProviderManagerApi::new(Arc::clone(api))),
    ))
}

pub fn provider_info(name: &str) -> ProviderInfo {
    ProviderInfo {
        name: name.to_string(),
        runner_id: "runner-1".to_string(),
        runner_name: "local".to_string(),
        version: "v0.1.0".to_string(),
        ..Default::default()
    }
}

pub fn job(id: &str, resource_type: ResourceType, action: JobAction, resource_id: &str) -> Job {
    Job {
        id: id.to_string(),
        resource_id: resource_id.to_string(),
        runner_id: Some("runner-1".to_string()),
        resource_type,
        state: JobState::Pending,
        action,
        metadata: None,
        error: None,
    }
}

pub fn job_dto(id: &str, resource_type: ResourceTypeDto, resource_id: &str) -> JobDto {
    JobDto {
        id: id.to_string(),
        resource_id: resource_id.to_string(),
        runner_id: Some("runner-1".to_string()),
        resource_type,
        state: JobStateDto::Pending,
        action: JobActionDto::Create,
        metadata: None,
        error: None,
        created_at: Some("2024-05-01T10:00:00Z".to_string()),
        updated_at: None,
    }
}

pub fn server_config() -> ServerConfig {
    server_config_dto().into()
}

pub fn server_config_dto() -> ServerConfigDto {
    ServerConfigDto {
        id: "srv42".to_string(),
        frps: Some(FrpsConfigDto {
            domain: "try-keel.dev".to_string(),
            port: 7000,
            protocol: "https".to_string(),
        }),
        api_port: 3986,
        headscale_port: 3987,
        registry_url: "https://registry.keel.dev".to_string(),
        builder_image: "keel/builder:latest".to_string(),
        builder_registry_server: "registry.keel.internal".to_string(),
        build_image_namespace: Some("keel".to_string()),
        default_workspace_image: "keel/workspace:latest".to_string(),
        default_workspace_user: "keel".to_string(),
    }
}

fn repository() -> GitRepositoryDto {
    GitRepositoryDto {
        url: "https://github.com/acme/app.git".to_string(),
        name: "app".to_string(),
        owner: "acme".to_string(),
        branch: Some("main".to_string()),
        sha: "abc123".to_string(),
        source: "github.com".to_string(),
    }
}

pub fn workspace_dto(id: &str, target_id: &str) -> WorkspaceDto {
    WorkspaceDto {
        id: id.to_string(),
        name: format!("{}-name", id),
        image: "keel/workspace:latest".to_string(),
        user: "keel".to_string(),
        target_id: target_id.to_string(),
        repository: repository(),
        ..Default::default()
    }
}

pub fn target_dto(id: &str, provider_name: &str) -> TargetDto {
    TargetDto {
        id: id.to_string(),
        name: format!("{}-name", id),
        target_config: TargetConfigDto {
            id: format!("tc-{}", id),
            name: "local".to_string(),
            provider_info: ProviderInfoDto {
                name: provider_name.to_string(),
                runner_id: "runner-1".to_string(),
                runner_name: "local".to_string(),
                version: "v0.1.0".to_string(),
                ..Default::default()
            },
            options: "{}".to_string(),
            deleted: false,
        },
        ..Default::default()
    }
}

pub fn build_dto(id: &str, state: &str) -> BuildDto {
    BuildDto {
        id: id.to_string(),
        repository: repository(),
        state: state.to_string(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
        updated_at: "2024-05-01T10:05:00Z".to_string(),
        ..Default::default()
    }
}

pub fn git_provider_dto(id: &str, provider_id: &str) -> GitProviderDto {
    GitProviderDto {
        id: id.to_string(),
        provider_id: provider_id.to_string(),
        username: "bot".to_string(),
        token: "token".to_string(),
        alias: provider_id.to_string(),
        ..Default::default()
    }
}
