//! Docker-backed task engine
//!
//! Production implementation of the [`Tasker`] contract over the Docker
//! Engine API. The engine keys every operation purely by the service id,
//! which names both the container and the host working directory, and keeps
//! no other local state: a freshly constructed engine pointed at the same
//! daemon and work root resumes observing and controlling tasks started by a
//! previous instance or process.

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::models::{ContainerCreateBody, ContainerState, ContainerStateStatusEnum, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, InspectContainerOptions,
    LogsOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptions,
    StopContainerOptionsBuilder,
};
use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use capstan_core::domain::{
    OperationStatus, ServiceOperation, data_items_to_map, ensure_unique_names,
};

use crate::config::EngineConfig;
use crate::error::{Result, TaskerError};
use crate::ident::validate_id;
use crate::status::{InspectedState, translate};
use crate::stream::{read_stream, scan_pull_error};
use crate::tasker::{Tasker, service_id};
use crate::workdir::WorkDir;

/// Tasker backed by the Docker Engine API
pub struct DockerTasker {
    docker: Docker,
    workdir: WorkDir,
}

impl DockerTasker {
    /// Connects to the local daemon, prepares the work root and pings
    ///
    /// Fails if the daemon is unreachable or the work root cannot be created.
    pub async fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let docker = Docker::connect_with_local_defaults()?;
        let workdir = WorkDir::new(&config.work_root);
        workdir.ensure_root().await?;

        docker.ping().await?;
        info!(
            "connected to container runtime, work root {}",
            workdir.root().display()
        );

        Ok(Self { docker, workdir })
    }

    /// Pulls an image, surfacing logical errors embedded in the pull stream
    ///
    /// The pull protocol can report transport-level success while encoding a
    /// failure line in its body, so the buffered progress output is scanned
    /// before declaring the pull good.
    async fn pull(&self, image: &str) -> Result<()> {
        let (from_image, tag) = split_image_ref(image);
        debug!("pulling image {}:{}", from_image, tag);

        let progress = self
            .docker
            .create_image(
                Some(
                    CreateImageOptionsBuilder::new()
                        .from_image(from_image)
                        .tag(tag)
                        .build(),
                ),
                None,
                None,
            )
            .map(|item| {
                item.map(|info| {
                    // Re-serialize each progress message so the buffered body
                    // can be scanned the same way for every runtime version.
                    let mut line = serde_json::to_vec(&info).unwrap_or_default();
                    line.push(b'\n');
                    Bytes::from(line)
                })
            })
            .boxed();

        let body = read_stream(progress, CancellationToken::new()).await?;
        if let Some(message) = scan_pull_error(&body) {
            return Err(TaskerError::Pull(message));
        }
        Ok(())
    }
}

#[async_trait]
impl Tasker for DockerTasker {
    async fn available(&self) -> bool {
        self.docker.ping().await.is_ok()
    }

    async fn run(&self, op: &ServiceOperation) -> Result<()> {
        let id = service_id(op)?;
        validate_id(id)?;
        ensure_unique_names(&op.service.input)?;

        let input = data_items_to_map(&op.service.input);
        self.workdir.prepare(id, &input).await?;

        self.pull(&op.plugin.image).await?;

        let env = env_from_config(&op.plugin.config);
        let body = ContainerCreateBody {
            image: Some(op.plugin.image.clone()),
            cmd: Some(vec![op.kind.as_str().to_string()]),
            tty: Some(true),
            env: if env.is_empty() { None } else { Some(env) },
            host_config: Some(HostConfig {
                binds: Some(vec![self.workdir.bind_spec(id)]),
                ..HostConfig::default()
            }),
            ..ContainerCreateBody::default()
        };

        self.docker
            .create_container(
                Some(CreateContainerOptionsBuilder::new().name(id).build()),
                body,
            )
            .await?;

        // No rollback from here on: if start fails the created container is
        // left for the caller to remove.
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;

        info!("started task {}", id);
        Ok(())
    }

    async fn stop(&self, op: &ServiceOperation, timeout: Duration) -> Result<()> {
        let id = service_id(op)?;
        let secs = timeout.as_secs().min(i32::MAX as u64) as i32;
        self.docker
            .stop_container(id, Some(StopContainerOptionsBuilder::new().t(secs).build()))
            .await?;
        info!("stopped task {}", id);
        Ok(())
    }

    async fn remove(&self, op: &ServiceOperation) -> Result<()> {
        let id = service_id(op)?;
        validate_id(id)?;

        let removed = self
            .docker
            .remove_container(
                id,
                Some(RemoveContainerOptionsBuilder::new().force(true).build()),
            )
            .await;

        // Directory cleanup always runs, even when container removal failed.
        if let Err(e) = self.workdir.remove(id).await {
            warn!("failed to delete working directory for {}: {}", id, e);
        }

        removed?;
        info!("removed task {}", id);
        Ok(())
    }

    async fn status(&self, op: &ServiceOperation) -> Result<OperationStatus> {
        let id = service_id(op)?;
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        let state = inspect
            .state
            .ok_or_else(|| TaskerError::UnknownState(id.to_string()))?;
        Ok(translate(&inspected_state(&state)))
    }

    async fn logs(&self, op: &ServiceOperation) -> Result<String> {
        let id = service_id(op)?;
        let stream = self
            .docker
            .logs(
                id,
                Some(LogsOptionsBuilder::new().stdout(true).stderr(true).build()),
            )
            .map(|item| item.map(LogOutput::into_bytes))
            .boxed();

        let buf = read_stream(stream, CancellationToken::new()).await?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    async fn progress(&self, op: &ServiceOperation) -> Result<String> {
        let id = service_id(op)?;
        self.workdir.progress(id).await
    }

    async fn outputs(&self, op: &ServiceOperation) -> Result<HashMap<String, Vec<String>>> {
        let id = service_id(op)?;
        self.workdir.outputs(id).await
    }
}

/// Splits an image reference into repository and tag, defaulting to `latest`
///
/// A colon inside the last path segment is a tag; a colon followed by a slash
/// is a registry port and not a tag.
fn split_image_ref(image: &str) -> (&str, &str) {
    match image.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, tag),
        _ => (image, "latest"),
    }
}

/// Extracts the `env` list of KEY=VALUE strings from plugin configuration
///
/// Anything that is not an array of strings is ignored.
fn env_from_config(config: &HashMap<String, Value>) -> Vec<String> {
    config
        .get("env")
        .and_then(Value::as_array)
        .map(|vals| {
            vals.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Maps the runtime's inspect response onto the translator's input flags
fn inspected_state(state: &ContainerState) -> InspectedState {
    InspectedState {
        created: state.status == Some(ContainerStateStatusEnum::CREATED),
        running: state.running.unwrap_or(false),
        dead: state.dead.unwrap_or(false),
        exited: state.status == Some(ContainerStateStatusEnum::EXITED),
        exit_code: state.exit_code.unwrap_or(0),
    }
}
