use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::probe::ProbeStrategy;

const CONFIG_FILE: &str = "codespace.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub ports: PortsConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// Per-language image overrides, keyed by canonical language name.
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// Sandbox container settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Host name used in the endpoint URLs handed back to students.
    #[serde(default = "default_publish_host")]
    pub publish_host: String,

    /// Port code-server listens on inside the container.
    #[serde(default = "default_container_port")]
    pub container_port: u16,

    /// Prefix for sandbox container names.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Seed directory bind-mounted into each sandbox workspace.
    /// Created with a README on first use if missing.
    #[serde(default)]
    pub workspace_template: Option<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            publish_host: default_publish_host(),
            container_port: default_container_port(),
            name_prefix: default_name_prefix(),
            workspace_template: None,
        }
    }
}

/// Host port range sandboxes are published on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsConfig {
    #[serde(default = "default_range_start")]
    pub range_start: u16,

    #[serde(default = "default_range_end")]
    pub range_end: u16,

    /// How many candidate ports to probe before reporting exhaustion.
    #[serde(default = "default_port_attempts")]
    pub max_attempts: u32,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            range_start: default_range_start(),
            range_end: default_range_end(),
            max_attempts: default_port_attempts(),
        }
    }
}

/// Readiness polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// How long to wait for a sandbox IDE to accept connections.
    #[serde(default = "default_ready_timeout")]
    pub timeout_secs: u64,

    /// Poll interval between probes.
    #[serde(default = "default_ready_interval")]
    pub interval_ms: u64,

    /// Upper bound for a single probe attempt.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// What counts as "answered": `tcp` or `http`.
    #[serde(default)]
    pub strategy: ProbeStrategy,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_ready_timeout(),
            interval_ms: default_ready_interval(),
            probe_timeout_ms: default_probe_timeout(),
            strategy: ProbeStrategy::default(),
        }
    }
}

impl ReadinessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

// Default value functions

fn default_publish_host() -> String {
    "localhost".to_string()
}

fn default_container_port() -> u16 {
    8080
}

fn default_name_prefix() -> String {
    "codespace".to_string()
}

fn default_range_start() -> u16 {
    40000
}

fn default_range_end() -> u16 {
    40999
}

fn default_port_attempts() -> u32 {
    64
}

fn default_ready_timeout() -> u64 {
    60
}

fn default_ready_interval() -> u64 {
    1000
}

fn default_probe_timeout() -> u64 {
    2000
}

impl Config {
    /// Load configuration from file, using defaults if not found
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations no allocation could ever satisfy.
    fn validate(&self) -> Result<()> {
        if self.ports.range_start > self.ports.range_end {
            anyhow::bail!(
                "Invalid port range: {} > {}",
                self.ports.range_start,
                self.ports.range_end
            );
        }
        if self.ports.max_attempts == 0 {
            anyhow::bail!("ports.max_attempts must be at least 1");
        }
        Ok(())
    }
}
