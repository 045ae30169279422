//! Docker-backed container runtime via bollard.
//!
//! Thin translation layer between the lifecycle manager's needs and the
//! Docker Engine API. No orchestration decisions live here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bollard::container::{
    Config as ContainerConfig, CreateContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::ListImagesOptions;
use bollard::service::{HostConfig, PortBinding};
use bollard::Docker;
use chrono::DateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{ContainerRuntime, ContainerSpec, SandboxSummary, LANGUAGE_LABEL, MANAGED_LABEL, OWNER_LABEL};

/// Seconds Docker waits before killing a container on stop.
const STOP_GRACE_SECS: i64 = 5;

/// Runtime backed by the local Docker daemon.
pub(crate) struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects to the local Docker daemon.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker. Is Docker running?")?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .context("Cannot ping Docker daemon. Is Docker running?")?;
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool> {
        image_present(&self.docker, image).await
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<String> {
        let service_port = format!("{}/tcp", spec.container_port);

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(service_port.clone(), HashMap::new());

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            service_port,
            Some(vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some(spec.host_port.to_string()),
            }]),
        );

        let labels: HashMap<String, String> = spec.labels.iter().cloned().collect();

        let config = ContainerConfig {
            image: Some(spec.image.clone()),
            cmd: Some(spec.cmd.clone()),
            env: Some(spec.env.clone()),
            tty: Some(true),
            exposed_ports: Some(exposed_ports),
            labels: Some(labels),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                binds: spec.workspace_bind.clone().map(|bind| vec![bind]),
                // The daemon reclaims the container once it exits, even if
                // our teardown never reaches it.
                auto_remove: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        debug!(name = %spec.name, image = %spec.image, "creating container");
        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: spec.name.clone(),
                    platform: None,
                }),
                config,
            )
            .await
            .context("Failed to create container")?;

        for warning in &created.warnings {
            warn!(container = %created.id, warning = %warning, "daemon warning on create");
        }

        Ok(created.id)
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.docker
            .start_container::<String>(id, None)
            .await
            .context("Failed to start container")?;
        Ok(())
    }

    async fn bound_host_port(&self, id: &str, container_port: u16) -> Result<Option<u16>> {
        let details = self
            .docker
            .inspect_container(id, None)
            .await
            .context("Failed to inspect container")?;

        let service_port = format!("{container_port}/tcp");
        let port = details
            .network_settings
            .and_then(|settings| settings.ports)
            .and_then(|mut ports| ports.remove(&service_port))
            .flatten()
            .and_then(|bindings| bindings.into_iter().next())
            .and_then(|binding| binding.host_port)
            .and_then(|host_port| host_port.parse::<u16>().ok());

        Ok(port)
    }

    async fn stop(&self, id: &str) -> Result<bool> {
        match self
            .docker
            .stop_container(id, Some(StopContainerOptions { t: STOP_GRACE_SECS }))
            .await
        {
            Ok(()) => Ok(true),
            // 304: already stopped. Still counts as a successful stop.
            Err(BollardError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(true),
            Err(err) if is_gone(&err) => Ok(false),
            Err(err) => Err(err).context("Failed to stop container"),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        match self
            .docker
            .remove_container(
                id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(true),
            Err(err) if is_gone(&err) => Ok(false),
            Err(err) => Err(err).context("Failed to remove container"),
        }
    }

    async fn list_managed(&self) -> Result<Vec<SandboxSummary>> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("{MANAGED_LABEL}=true")],
        );

        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                filters,
                ..Default::default()
            }))
            .await
            .context("Failed to list containers")?;

        let summaries = containers
            .into_iter()
            .map(|container| {
                let labels = container.labels.unwrap_or_default();
                SandboxSummary {
                    id: container.id.unwrap_or_default(),
                    name: container
                        .names
                        .unwrap_or_default()
                        .first()
                        .map(|name| name.trim_start_matches('/').to_string())
                        .unwrap_or_default(),
                    image: container.image.unwrap_or_default(),
                    owner: labels.get(OWNER_LABEL).cloned(),
                    language: labels.get(LANGUAGE_LABEL).cloned(),
                    host_port: container.ports.unwrap_or_default().into_iter().find_map(
                        |port| port.public_port.and_then(|p| u16::try_from(p).ok()),
                    ),
                    running: container.state.as_deref() == Some("running"),
                    created_at: container
                        .created
                        .and_then(|secs| DateTime::from_timestamp(secs, 0)),
                }
            })
            .collect();

        Ok(summaries)
    }
}

/// Container-not-found class of daemon responses. Removal racing the
/// daemon's own auto-remove shows up as 409.
fn is_gone(err: &BollardError) -> bool {
    matches!(
        err,
        BollardError::DockerResponseServerError {
            status_code: 404 | 409,
            ..
        }
    )
}

/// Check if a Docker image exists locally.
pub(crate) async fn image_present(docker: &Docker, image: &str) -> Result<bool> {
    let images = docker
        .list_images(Some(ListImagesOptions::<String> {
            all: true,
            ..Default::default()
        }))
        .await
        .context("Failed to list images")?;

    let (name, tag) = parse_image_tag(image);

    let found = images.iter().any(|img| {
        img.repo_tags.iter().any(|tag_str| {
            if let Some(colon_pos) = tag_str.rfind(':') {
                let (n, t) = tag_str.split_at(colon_pos);
                n == name && &t[1..] == tag
            } else {
                tag_str == name && tag == "latest"
            }
        })
    });

    Ok(found)
}

/// Parse image name and tag from a string.
pub(crate) fn parse_image_tag(image: &str) -> (&str, &str) {
    if let Some(colon_pos) = image.rfind(':') {
        let (name, tag) = image.split_at(colon_pos);
        (name, &tag[1..])
    } else {
        (image, "latest")
    }
}
