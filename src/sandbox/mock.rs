//! In-memory container runtime for tests.
//!
//! Behaves like a tiny Docker: containers get ids, hold their published port
//! open with a real listener so the readiness prober can connect, and
//! disappear on remove. Failure modes are switchable per test.

#![allow(dead_code)] // Exercised from tests only

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::{
    ContainerRuntime, ContainerSpec, SandboxSummary, LANGUAGE_LABEL, OWNER_LABEL,
};

/// Failure knobs for [`MockRuntime`].
#[derive(Debug, Clone, Default)]
pub(crate) struct MockBehavior {
    /// Images to report as missing from the local store.
    pub missing_images: Vec<String>,
    /// Fail every container creation.
    pub fail_create: bool,
    /// Fail this many starts before letting one succeed.
    pub fail_start_times: u32,
    /// Start without opening the published port; the sandbox never becomes
    /// reachable.
    pub unreachable: bool,
    /// Report no port binding on inspection.
    pub report_no_binding: bool,
}

struct MockContainer {
    spec: ContainerSpec,
    running: bool,
    /// Held open so the published port accepts connections.
    listener: Option<TcpListener>,
}

/// Scriptable [`ContainerRuntime`] double.
pub(crate) struct MockRuntime {
    behavior: MockBehavior,
    start_failures_left: AtomicU32,
    next_id: AtomicU32,
    containers: Mutex<HashMap<String, MockContainer>>,
}

impl MockRuntime {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            start_failures_left: AtomicU32::new(behavior.fail_start_times),
            behavior,
            next_id: AtomicU32::new(0),
            containers: Mutex::new(HashMap::new()),
        }
    }

    /// Containers currently known to the runtime, running or not.
    pub async fn container_count(&self) -> usize {
        self.containers.lock().await.len()
    }

    pub async fn is_running(&self, id: &str) -> bool {
        self.containers
            .lock()
            .await
            .get(id)
            .is_some_and(|container| container.running)
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool> {
        Ok(!self.behavior.missing_images.iter().any(|m| m == image))
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<String> {
        if self.behavior.fail_create {
            bail!("mock: create refused");
        }
        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.containers.lock().await.insert(
            id.clone(),
            MockContainer {
                spec: spec.clone(),
                running: false,
                listener: None,
            },
        );
        Ok(id)
    }

    async fn start(&self, id: &str) -> Result<()> {
        if self
            .start_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
        {
            bail!("mock: port is already allocated");
        }

        let mut containers = self.containers.lock().await;
        let Some(container) = containers.get_mut(id) else {
            bail!("mock: no such container {id}");
        };
        if !self.behavior.unreachable {
            let listener = TcpListener::bind(("127.0.0.1", container.spec.host_port)).await?;
            container.listener = Some(listener);
        }
        container.running = true;
        Ok(())
    }

    async fn bound_host_port(&self, id: &str, _container_port: u16) -> Result<Option<u16>> {
        if self.behavior.report_no_binding {
            return Ok(None);
        }
        let containers = self.containers.lock().await;
        let Some(container) = containers.get(id) else {
            bail!("mock: no such container {id}");
        };
        Ok(Some(container.spec.host_port))
    }

    async fn stop(&self, id: &str) -> Result<bool> {
        let mut containers = self.containers.lock().await;
        match containers.get_mut(id) {
            Some(container) => {
                container.running = false;
                container.listener = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.containers.lock().await.remove(id).is_some())
    }

    async fn list_managed(&self) -> Result<Vec<SandboxSummary>> {
        let containers = self.containers.lock().await;
        let summaries = containers
            .iter()
            .map(|(id, container)| {
                let label = |key: &str| {
                    container
                        .spec
                        .labels
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.clone())
                };
                SandboxSummary {
                    id: id.clone(),
                    name: container.spec.name.clone(),
                    image: container.spec.image.clone(),
                    owner: label(OWNER_LABEL),
                    language: label(LANGUAGE_LABEL),
                    host_port: Some(container.spec.host_port),
                    running: container.running,
                    created_at: Some(Utc::now()),
                }
            })
            .collect();
        Ok(summaries)
    }
}
