//! Docker-backed per-student sandbox provisioning.
//!
//! The lifecycle manager owns the orchestration; the [`ContainerRuntime`]
//! trait is the narrow seam to the container engine so tests can run against
//! an in-memory fake.

pub(crate) mod docker;
pub(crate) mod error;
mod manager;
mod mock;

pub(crate) use docker::DockerRuntime;
pub(crate) use manager::SandboxManager;
#[allow(unused_imports)] // Used by manager tests
pub(crate) use mock::{MockBehavior, MockRuntime};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Label marking containers as managed by this service.
pub(crate) const MANAGED_LABEL: &str = "codespace.managed";

/// Label carrying the owner id on managed containers.
pub(crate) const OWNER_LABEL: &str = "codespace.owner";

/// Label carrying the language key on managed containers.
pub(crate) const LANGUAGE_LABEL: &str = "codespace.language";

/// Everything needed to create one sandbox container.
#[derive(Debug, Clone)]
pub(crate) struct ContainerSpec {
    /// Unique container name.
    pub name: String,
    /// Image reference resolved for the requested language.
    pub image: String,
    /// Port the IDE listens on inside the container.
    pub container_port: u16,
    /// Host port the service port is published on.
    pub host_port: u16,
    /// Environment variables, `KEY=value`.
    pub env: Vec<String>,
    /// Command line for the in-container IDE server.
    pub cmd: Vec<String>,
    /// Optional `host:container:mode` workspace bind.
    pub workspace_bind: Option<String>,
    /// Labels identifying the container as ours.
    pub labels: Vec<(String, String)>,
}

/// A managed container as reported by the runtime.
#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct SandboxSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub owner: Option<String>,
    pub language: Option<String>,
    pub host_port: Option<u16>,
    pub running: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Container runtime operations the lifecycle manager depends on.
#[async_trait]
pub(crate) trait ContainerRuntime: Send + Sync {
    /// Verifies the engine daemon is reachable.
    async fn ping(&self) -> Result<()>;

    /// Whether `image` is present in the local image store.
    async fn image_exists(&self, image: &str) -> Result<bool>;

    /// Creates a container, returning the runtime-assigned id.
    async fn create(&self, spec: &ContainerSpec) -> Result<String>;

    /// Starts a created container.
    async fn start(&self, id: &str) -> Result<()>;

    /// Host port actually bound for the exposed `container_port`, if any.
    async fn bound_host_port(&self, id: &str, container_port: u16) -> Result<Option<u16>>;

    /// Stops the container. `Ok(false)` when it was already gone.
    async fn stop(&self, id: &str) -> Result<bool>;

    /// Removes the container. `Ok(false)` when it was already gone.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// All containers carrying the managed label, running or not.
    async fn list_managed(&self) -> Result<Vec<SandboxSummary>>;
}
