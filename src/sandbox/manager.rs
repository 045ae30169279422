//! Sandbox lifecycle orchestration.
//!
//! `provision` walks a strict sequence: resolve image, reserve a host port,
//! pre-flight the runtime, create and start the container, read back the real
//! port binding, wait for the IDE to answer, then record the session. Every
//! failure before Ready rolls back whatever was acquired, so failed attempts
//! never leak host ports or orphan containers. The one deliberate exception:
//! a sandbox that starts but misses the readiness deadline is left running
//! for the caller to retry or tear down.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::SandboxError;
use super::{
    ContainerRuntime, ContainerSpec, SandboxSummary, LANGUAGE_LABEL, MANAGED_LABEL, OWNER_LABEL,
};
use crate::config::Config;
use crate::images::{ImageRegistry, Language};
use crate::ports::PortTable;
use crate::probe::ReadinessProber;
use crate::sessions::SessionRegistry;

/// Directory code-server opens as the project workspace.
const WORKSPACE_DIR: &str = "/home/coder/project";

/// Lifecycle states of a sandbox instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SandboxState {
    /// Accepted, nothing acquired yet.
    Requested,
    /// Container exists but has not been started.
    Created,
    /// Container is running; IDE not yet confirmed reachable.
    Started,
    /// IDE answered; session registered.
    Ready,
    Stopped,
    Removed,
    /// Terminal; reached from any pre-Ready state on error.
    Failed,
}

impl std::fmt::Display for SandboxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Requested => "requested",
            Self::Created => "created",
            Self::Started => "started",
            Self::Ready => "ready",
            Self::Stopped => "stopped",
            Self::Removed => "removed",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// One tracked sandbox instance.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SandboxInstance {
    pub id: String,
    pub owner: String,
    pub language: Language,
    pub image: String,
    pub host_port: u16,
    pub endpoint: String,
    pub state: SandboxState,
    pub created_at: DateTime<Utc>,
}

/// What a successful provision hands back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Provisioned {
    pub endpoint: String,
    pub sandbox_id: String,
}

/// Orchestrates sandbox provisioning and teardown.
pub(crate) struct SandboxManager {
    runtime: Arc<dyn ContainerRuntime>,
    images: ImageRegistry,
    ports: PortTable,
    sessions: SessionRegistry,
    prober: ReadinessProber,
    instances: Mutex<HashMap<String, SandboxInstance>>,
    publish_host: String,
    container_port: u16,
    name_prefix: String,
    ready_timeout: Duration,
    workspace_bind: Option<String>,
}

impl SandboxManager {
    /// Builds a manager from configuration. Fails on unusable config
    /// (bad workspace template path, unbuildable probe client).
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: Config) -> Result<Self> {
        let workspace_bind = config
            .sandbox
            .workspace_template
            .as_deref()
            .map(resolve_workspace_template)
            .transpose()?;

        let prober = ReadinessProber::new(
            config.readiness.strategy,
            config.readiness.interval(),
            config.readiness.probe_timeout(),
        )?;

        Ok(Self {
            runtime,
            images: ImageRegistry::new(&config.images),
            ports: PortTable::new(
                config.ports.range_start,
                config.ports.range_end,
                config.ports.max_attempts,
            ),
            sessions: SessionRegistry::new(),
            prober,
            instances: Mutex::new(HashMap::new()),
            publish_host: config.sandbox.publish_host,
            container_port: config.sandbox.container_port,
            name_prefix: config.sandbox.name_prefix,
            ready_timeout: config.readiness.timeout(),
            workspace_bind,
        })
    }

    /// Provisions a sandbox for `owner` running the environment named by
    /// `selector`, returning its endpoint once the IDE accepts connections.
    pub async fn provision(
        &self,
        owner: &str,
        selector: &str,
    ) -> Result<Provisioned, SandboxError> {
        // Fail fast on bad input, before acquiring anything.
        let (language, image) = self.images.resolve(selector)?;
        debug!(owner, %language, %image, "provisioning sandbox");

        let port = self.ports.allocate().await?;

        if let Err(err) = self.preflight(&image).await {
            self.ports.release(port).await;
            return Err(err);
        }

        let (sandbox_id, port) = self.create_and_start(owner, language, &image, port).await?;

        // Explicit bindings should match the request, but the runtime's
        // answer wins.
        let bound = match self
            .runtime
            .bound_host_port(&sandbox_id, self.container_port)
            .await
        {
            Ok(Some(bound)) => bound,
            Ok(None) => {
                self.abort_started(&sandbox_id, port).await;
                return Err(SandboxError::start_failed(format!(
                    "runtime reports no host port binding for {sandbox_id}"
                )));
            }
            Err(err) => {
                self.abort_started(&sandbox_id, port).await;
                return Err(SandboxError::start_failed(format!(
                    "inspect failed for {sandbox_id}: {err:#}"
                )));
            }
        };

        if bound != port {
            warn!(requested = port, bound, "runtime bound a different host port than requested");
            self.ports.release(port).await;
            self.ports.claim(bound).await;
        }

        let endpoint = self.endpoint_url(bound);
        self.update_instance(&sandbox_id, |instance| {
            instance.host_port = bound;
            instance.endpoint.clone_from(&endpoint);
        })
        .await;

        let ready = self
            .prober
            .await_ready(&self.publish_host, bound, self.ready_timeout)
            .await;
        if !ready {
            // Left running on purpose: code-server may still be warming up,
            // and the caller can retry without paying another cold start.
            warn!(sandbox_id = %sandbox_id, %endpoint, "sandbox missed the readiness deadline");
            return Err(SandboxError::not_ready(
                sandbox_id,
                endpoint,
                self.ready_timeout,
            ));
        }

        if let Some(previous) = self.sessions.register(owner, &sandbox_id, &endpoint).await {
            warn!(
                owner,
                previous = %previous.sandbox_id,
                "owner already had an active sandbox; registry now points at the new one"
            );
        }
        self.update_instance(&sandbox_id, |instance| {
            instance.state = SandboxState::Ready;
        })
        .await;
        info!(owner, sandbox_id = %sandbox_id, %endpoint, "sandbox ready");

        Ok(Provisioned {
            endpoint,
            sandbox_id,
        })
    }

    /// Stops and removes a sandbox. Idempotent: an already-gone sandbox
    /// counts as success. The session entry is cleared regardless of how the
    /// stop turns out; teardown itself is best-effort because the
    /// container's auto-remove reclaims it on exit anyway.
    pub async fn terminate(&self, sandbox_id: &str) -> bool {
        if let Some((owner, _)) = self.sessions.remove_sandbox(sandbox_id).await {
            debug!(%owner, sandbox_id, "cleared session registry entry");
        }

        let stopped = match self.runtime.stop(sandbox_id).await {
            Ok(true) => {
                self.update_instance(sandbox_id, |instance| {
                    instance.state = SandboxState::Stopped;
                })
                .await;
                debug!(sandbox_id, "sandbox stopped");
                true
            }
            Ok(false) => {
                debug!(sandbox_id, "sandbox already gone");
                true
            }
            Err(err) => {
                let failure =
                    SandboxError::termination_failed(sandbox_id, format!("stop: {err:#}"));
                warn!(sandbox_id, error = %failure, "best-effort stop failed");
                false
            }
        };

        let removed = match self.runtime.remove(sandbox_id).await {
            Ok(_) => {
                self.update_instance(sandbox_id, |instance| {
                    instance.state = SandboxState::Removed;
                })
                .await;
                true
            }
            Err(err) => {
                let failure =
                    SandboxError::termination_failed(sandbox_id, format!("remove: {err:#}"));
                warn!(sandbox_id, error = %failure, "best-effort remove failed");
                false
            }
        };

        // Only forget the instance (and free its port) once the container is
        // actually out of the way; a still-running sandbox keeps its port.
        if stopped || removed {
            if let Some(instance) = self.instances.lock().await.remove(sandbox_id) {
                self.ports.release(instance.host_port).await;
            }
        }

        stopped || removed
    }

    /// All containers the runtime currently knows as ours, for operator
    /// listings across process restarts.
    pub async fn running_sandboxes(&self) -> Result<Vec<SandboxSummary>, SandboxError> {
        self.runtime
            .list_managed()
            .await
            .map_err(|err| SandboxError::runtime_unavailable(format!("{err:#}")))
    }

    async fn preflight(&self, image: &str) -> Result<(), SandboxError> {
        self.runtime
            .ping()
            .await
            .map_err(|err| SandboxError::runtime_unavailable(format!("{err:#}")))?;

        // Creating against a missing image fails late with a muddy error;
        // checking up front keeps the category clean.
        match self.runtime.image_exists(image).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(SandboxError::image_not_available(image)),
            Err(err) => Err(SandboxError::runtime_unavailable(format!("{err:#}"))),
        }
    }

    /// Creates and starts the container, retrying once on a fresh port. The
    /// free-port probe and the container bind are not atomic, so a start
    /// failure may just mean we lost the race for the port.
    async fn create_and_start(
        &self,
        owner: &str,
        language: Language,
        image: &str,
        port: u16,
    ) -> Result<(String, u16), SandboxError> {
        match self.try_create_and_start(owner, language, image, port).await {
            Ok(id) => Ok((id, port)),
            Err(first_err) => {
                self.ports.release(port).await;
                warn!(error = %first_err, port, "sandbox start failed, retrying once on a fresh port");

                let retry_port = self.ports.allocate().await?;
                match self
                    .try_create_and_start(owner, language, image, retry_port)
                    .await
                {
                    Ok(id) => Ok((id, retry_port)),
                    Err(err) => {
                        self.ports.release(retry_port).await;
                        Err(err)
                    }
                }
            }
        }
    }

    async fn try_create_and_start(
        &self,
        owner: &str,
        language: Language,
        image: &str,
        port: u16,
    ) -> Result<String, SandboxError> {
        let mut instance = SandboxInstance {
            id: String::new(),
            owner: owner.to_string(),
            language,
            image: image.to_string(),
            host_port: port,
            endpoint: self.endpoint_url(port),
            state: SandboxState::Requested,
            created_at: Utc::now(),
        };

        let spec = self.container_spec(owner, language, image, port);
        let id = self
            .runtime
            .create(&spec)
            .await
            .map_err(|err| SandboxError::start_failed(format!("create: {err:#}")))?;

        instance.id.clone_from(&id);
        instance.state = SandboxState::Created;
        self.instances.lock().await.insert(id.clone(), instance);
        debug!(sandbox_id = %id, image, port, "sandbox container created");

        if let Err(err) = self.runtime.start(&id).await {
            self.remove_partial(&id).await;
            return Err(SandboxError::start_failed(format!("start: {err:#}")));
        }
        self.update_instance(&id, |instance| {
            instance.state = SandboxState::Started;
        })
        .await;

        Ok(id)
    }

    /// Best-effort removal of a container that never became usable.
    async fn remove_partial(&self, sandbox_id: &str) {
        self.update_instance(sandbox_id, |instance| {
            instance.state = SandboxState::Failed;
        })
        .await;
        if let Err(err) = self.runtime.remove(sandbox_id).await {
            warn!(sandbox_id, error = %format!("{err:#}"), "failed to remove partial sandbox");
        }
        self.instances.lock().await.remove(sandbox_id);
    }

    async fn abort_started(&self, sandbox_id: &str, port: u16) {
        self.remove_partial(sandbox_id).await;
        self.ports.release(port).await;
    }

    fn endpoint_url(&self, port: u16) -> String {
        format!("http://{}:{}", self.publish_host, port)
    }

    fn container_spec(
        &self,
        owner: &str,
        language: Language,
        image: &str,
        port: u16,
    ) -> ContainerSpec {
        let token = Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}-{}-{}",
            self.name_prefix,
            sanitize_owner(owner),
            &token[..8]
        );

        ContainerSpec {
            name,
            image: image.to_string(),
            container_port: self.container_port,
            host_port: port,
            // The IDE runs embedded in the lab UI; the platform in front of
            // it owns access control.
            env: vec!["CS_DISABLE_IFRAME_PROTECTION=true".to_string()],
            cmd: vec![
                "code-server".to_string(),
                "--bind-addr".to_string(),
                format!("0.0.0.0:{}", self.container_port),
                "--auth".to_string(),
                "none".to_string(),
            ],
            workspace_bind: self.workspace_bind.clone(),
            labels: vec![
                (MANAGED_LABEL.to_string(), "true".to_string()),
                (OWNER_LABEL.to_string(), owner.to_string()),
                (LANGUAGE_LABEL.to_string(), language.key().to_string()),
            ],
        }
    }

    async fn update_instance(&self, sandbox_id: &str, apply: impl FnOnce(&mut SandboxInstance)) {
        if let Some(instance) = self.instances.lock().await.get_mut(sandbox_id) {
            apply(instance);
        }
    }
}

/// Turns an owner id into a container-name-safe fragment.
fn sanitize_owner(owner: &str) -> String {
    let cleaned: String = owner
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

/// Resolves the workspace template directory to a Docker bind string,
/// seeding the directory with a README if it does not exist yet.
fn resolve_workspace_template(path: &str) -> Result<String> {
    let expanded = expand_path(path)?;
    let absolute = if std::path::Path::new(&expanded).is_absolute() {
        std::path::PathBuf::from(&expanded)
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&expanded)
    };

    if !absolute.exists() {
        std::fs::create_dir_all(&absolute).with_context(|| {
            format!("Failed to create workspace template: {}", absolute.display())
        })?;
        std::fs::write(
            absolute.join("README.md"),
            "# Welcome to your workspace\n",
        )
        .context("Failed to seed workspace template")?;
    }

    Ok(format!("{}:{WORKSPACE_DIR}:rw", absolute.display()))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{MockBehavior, MockRuntime};

    fn test_config(range_start: u16) -> Config {
        let mut config = Config::default();
        config.sandbox.publish_host = "127.0.0.1".to_string();
        config.ports.range_start = range_start;
        config.ports.range_end = range_start + 15;
        config.ports.max_attempts = 16;
        config.readiness.timeout_secs = 2;
        config.readiness.interval_ms = 50;
        config.readiness.probe_timeout_ms = 200;
        config
    }

    fn manager_with(
        behavior: MockBehavior,
        range_start: u16,
    ) -> (SandboxManager, Arc<MockRuntime>) {
        let runtime = Arc::new(MockRuntime::new(behavior));
        let manager =
            SandboxManager::new(runtime.clone(), test_config(range_start)).unwrap();
        (manager, runtime)
    }

    #[tokio::test]
    async fn test_provision_happy_path() {
        let (manager, runtime) = manager_with(MockBehavior::default(), 21100);

        let provisioned = manager.provision("u1", "python").await.unwrap();
        assert!(!provisioned.sandbox_id.is_empty());
        assert!(
            provisioned.endpoint.starts_with("http://127.0.0.1:"),
            "unexpected endpoint {}",
            provisioned.endpoint
        );

        // Session registry now resolves the owner to this sandbox.
        let entry = manager.sessions.lookup("u1").await.unwrap();
        assert_eq!(entry.sandbox_id, provisioned.sandbox_id);
        assert_eq!(entry.endpoint, provisioned.endpoint);

        // Instance is tracked as ready, its port reserved.
        let instances = manager.instances.lock().await;
        let instance = instances.get(&provisioned.sandbox_id).unwrap();
        assert_eq!(instance.state, SandboxState::Ready);
        assert_eq!(instance.owner, "u1");
        assert_eq!(instance.language, Language::Python);
        drop(instances);
        assert_eq!(manager.ports.reserved_count().await, 1);
        assert!(runtime.is_running(&provisioned.sandbox_id).await);
    }

    #[tokio::test]
    async fn test_unsupported_language_consumes_nothing() {
        let (manager, runtime) = manager_with(MockBehavior::default(), 21116);

        let err = manager.provision("u2", "cobol").await.unwrap_err();
        assert!(matches!(err, SandboxError::UnsupportedLanguage { .. }));

        assert_eq!(manager.ports.reserved_count().await, 0);
        assert_eq!(manager.sessions.len().await, 0);
        assert_eq!(runtime.container_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_image_rolls_back_port() {
        let behavior = MockBehavior {
            missing_images: vec!["codespace-python:latest".to_string()],
            ..Default::default()
        };
        let (manager, runtime) = manager_with(behavior, 21132);

        let err = manager.provision("u1", "python").await.unwrap_err();
        assert!(matches!(err, SandboxError::ImageNotAvailable { .. }));

        assert_eq!(manager.ports.reserved_count().await, 0);
        assert_eq!(manager.sessions.len().await, 0);
        assert_eq!(runtime.container_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_failure_leaks_nothing() {
        let behavior = MockBehavior {
            fail_create: true,
            ..Default::default()
        };
        let (manager, runtime) = manager_with(behavior, 21148);

        let err = manager.provision("u1", "java").await.unwrap_err();
        assert!(matches!(err, SandboxError::SandboxStartFailed { .. }));

        assert_eq!(manager.ports.reserved_count().await, 0);
        assert_eq!(manager.sessions.len().await, 0);
        assert_eq!(runtime.container_count().await, 0);
        assert!(manager.instances.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_failure_retries_once_on_fresh_port() {
        let behavior = MockBehavior {
            fail_start_times: 1,
            ..Default::default()
        };
        let (manager, runtime) = manager_with(behavior, 21164);

        let provisioned = manager.provision("u1", "python").await.unwrap();

        // The failed first container was removed; only the retry survives.
        assert_eq!(runtime.container_count().await, 1);
        assert!(runtime.is_running(&provisioned.sandbox_id).await);
        assert_eq!(manager.ports.reserved_count().await, 1);
    }

    #[tokio::test]
    async fn test_persistent_start_failure_gives_up_cleanly() {
        let behavior = MockBehavior {
            fail_start_times: u32::MAX,
            ..Default::default()
        };
        let (manager, runtime) = manager_with(behavior, 21180);

        let err = manager.provision("u1", "python").await.unwrap_err();
        assert!(matches!(err, SandboxError::SandboxStartFailed { .. }));

        assert_eq!(manager.ports.reserved_count().await, 0);
        assert_eq!(runtime.container_count().await, 0);
        assert_eq!(manager.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_no_binding_reported_cleans_up() {
        let behavior = MockBehavior {
            report_no_binding: true,
            ..Default::default()
        };
        let (manager, runtime) = manager_with(behavior, 21196);

        let err = manager.provision("u1", "python").await.unwrap_err();
        assert!(matches!(err, SandboxError::SandboxStartFailed { .. }));

        assert_eq!(manager.ports.reserved_count().await, 0);
        assert_eq!(runtime.container_count().await, 0);
    }

    #[tokio::test]
    async fn test_not_ready_leaves_sandbox_running() {
        let behavior = MockBehavior {
            unreachable: true,
            ..Default::default()
        };
        let runtime = Arc::new(MockRuntime::new(behavior));
        let mut config = test_config(21212);
        config.readiness.timeout_secs = 1;
        let manager = SandboxManager::new(runtime.clone(), config).unwrap();

        let err = manager.provision("u1", "python").await.unwrap_err();
        let SandboxError::SandboxNotReady { sandbox_id, .. } = err else {
            panic!("expected SandboxNotReady, got {err}");
        };

        // Still running, still tracked, port still held, but no session.
        assert!(runtime.is_running(&sandbox_id).await);
        let instances = manager.instances.lock().await;
        assert_eq!(instances.get(&sandbox_id).unwrap().state, SandboxState::Started);
        drop(instances);
        assert_eq!(manager.ports.reserved_count().await, 1);
        assert_eq!(manager.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_provisions_get_distinct_ports() {
        let (manager, _runtime) = manager_with(MockBehavior::default(), 21228);

        let (a, b) = tokio::join!(
            manager.provision("u3", "python"),
            manager.provision("u4", "python")
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_ne!(a.endpoint, b.endpoint);
        assert_ne!(a.sandbox_id, b.sandbox_id);
        assert_eq!(manager.sessions.len().await, 2);
        assert_eq!(manager.ports.reserved_count().await, 2);
    }

    #[tokio::test]
    async fn test_terminate_is_idempotent() {
        let (manager, runtime) = manager_with(MockBehavior::default(), 21244);
        let provisioned = manager.provision("u1", "python").await.unwrap();

        assert!(manager.terminate(&provisioned.sandbox_id).await);
        assert!(manager.terminate(&provisioned.sandbox_id).await);

        assert_eq!(runtime.container_count().await, 0);
        assert_eq!(manager.ports.reserved_count().await, 0);
        assert!(manager.sessions.lookup("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_terminate_unknown_sandbox_succeeds() {
        let (manager, _runtime) = manager_with(MockBehavior::default(), 21260);
        assert!(manager.terminate("never-existed").await);
    }

    #[tokio::test]
    async fn test_reprovision_replaces_session_entry() {
        let (manager, _runtime) = manager_with(MockBehavior::default(), 21276);

        let first = manager.provision("u1", "python").await.unwrap();
        let second = manager.provision("u1", "javascript").await.unwrap();
        assert_ne!(first.sandbox_id, second.sandbox_id);

        let entry = manager.sessions.lookup("u1").await.unwrap();
        assert_eq!(entry.sandbox_id, second.sandbox_id);
        assert_eq!(manager.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_container_spec_matches_ide_contract() {
        let (manager, _runtime) = manager_with(MockBehavior::default(), 21292);
        let spec = manager.container_spec("U 1!", Language::Python, "codespace-python:latest", 21292);

        assert!(spec.name.starts_with("codespace-u-1--"));
        assert_eq!(spec.image, "codespace-python:latest");
        assert_eq!(spec.container_port, 8080);
        assert_eq!(spec.host_port, 21292);
        assert_eq!(spec.env, vec!["CS_DISABLE_IFRAME_PROTECTION=true"]);
        assert_eq!(
            spec.cmd,
            vec!["code-server", "--bind-addr", "0.0.0.0:8080", "--auth", "none"]
        );
        assert!(spec
            .labels
            .contains(&(MANAGED_LABEL.to_string(), "true".to_string())));
        assert!(spec
            .labels
            .contains(&(LANGUAGE_LABEL.to_string(), "python".to_string())));
    }

    #[test]
    fn test_sanitize_owner() {
        assert_eq!(sanitize_owner("Student42"), "student42");
        assert_eq!(sanitize_owner("jane.doe@lab"), "jane-doe-lab");
        assert_eq!(sanitize_owner("  "), "user");
        assert_eq!(sanitize_owner("a_b-c"), "a_b-c");
    }

    #[test]
    fn test_resolve_workspace_template_seeds_directory() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template-workspace");

        let bind = resolve_workspace_template(template.to_str().unwrap()).unwrap();
        assert!(bind.ends_with(":/home/coder/project:rw"));
        assert!(template.join("README.md").exists());
    }

    #[test]
    fn test_expand_path_passthrough() {
        assert_eq!(expand_path("/srv/workspace").unwrap(), "/srv/workspace");
        if dirs::home_dir().is_some() {
            let expanded = expand_path("~/workspaces").unwrap();
            assert!(!expanded.starts_with('~'));
            assert!(expanded.ends_with("/workspaces"));
        }
    }
}
