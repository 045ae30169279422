//! Readiness probing for freshly started sandboxes.
//!
//! The runtime reporting "started" does not mean code-server is accepting
//! connections yet. The prober polls the published endpoint until it answers
//! or the deadline passes. Every attempt carries its own timeout, so a hung
//! connect cannot stall the loop past the overall deadline.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::debug;

/// What counts as "the sandbox answered".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStrategy {
    /// A completed TCP connect counts as ready.
    #[default]
    Tcp,
    /// Requires an HTTP response; any status counts.
    Http,
}

impl std::fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Polls a sandbox endpoint until it responds or a timeout elapses.
#[derive(Debug, Clone)]
pub(crate) struct ReadinessProber {
    strategy: ProbeStrategy,
    interval: Duration,
    attempt_timeout: Duration,
    http: reqwest::Client,
}

impl ReadinessProber {
    /// Creates a prober polling every `interval`, with each individual
    /// attempt bounded by `attempt_timeout`.
    pub fn new(
        strategy: ProbeStrategy,
        interval: Duration,
        attempt_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(attempt_timeout)
            .build()
            .context("Failed to build readiness HTTP client")?;

        Ok(Self {
            strategy,
            interval,
            attempt_timeout,
            http,
        })
    }

    /// Polls `host:port` until ready. Returns `true` on the first successful
    /// probe, `false` once `timeout` elapses without one. Never blocks past
    /// the deadline by more than a single bounded attempt.
    pub async fn await_ready(&self, host: &str, port: u16, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            if self.probe_once(host, port).await {
                debug!(host, port, attempts, "sandbox endpoint is accepting connections");
                return true;
            }
            if Instant::now() >= deadline {
                debug!(host, port, attempts, "gave up waiting for sandbox endpoint");
                return false;
            }
            time::sleep(self.interval).await;
        }
    }

    async fn probe_once(&self, host: &str, port: u16) -> bool {
        match self.strategy {
            ProbeStrategy::Tcp => matches!(
                time::timeout(self.attempt_timeout, TcpStream::connect((host, port))).await,
                Ok(Ok(_))
            ),
            ProbeStrategy::Http => {
                // The IDE answering at all is enough; redirects and auth
                // pages still mean it is up.
                let url = format!("http://{host}:{port}/");
                self.http.get(&url).send().await.is_ok()
            }
        }
    }
}
