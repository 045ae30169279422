//! Host port reservation for sandbox publishing.
//!
//! A port stays reserved from `allocate()` until `release()`, covering the
//! window between the free-port probe and Docker actually binding it. The
//! probe and the eventual container bind are not atomic; the lifecycle
//! manager retries once with a fresh port when Docker loses that race.

use std::collections::HashSet;
use std::net::TcpListener;

use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::sandbox::error::SandboxError;

/// Mutex-guarded reservation table over a configured host port range.
#[derive(Debug)]
pub(crate) struct PortTable {
    range_start: u16,
    range_end: u16,
    max_attempts: u32,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    reserved: HashSet<u16>,
    /// Next candidate, so consecutive allocations don't re-probe the same
    /// low ports.
    cursor: u16,
}

impl PortTable {
    /// Creates a table over `range_start..=range_end`, probing at most
    /// `max_attempts` candidates per allocation.
    pub fn new(range_start: u16, range_end: u16, max_attempts: u32) -> Self {
        Self {
            range_start,
            range_end,
            max_attempts,
            inner: Mutex::new(Inner {
                reserved: HashSet::new(),
                cursor: range_start,
            }),
        }
    }

    /// Reserves a host port that is neither held by a tracked sandbox nor
    /// bound by any other process.
    ///
    /// Safe under concurrent calls: two in-flight allocations never receive
    /// the same port.
    pub async fn allocate(&self) -> Result<u16, SandboxError> {
        let span = u32::from(self.range_end - self.range_start) + 1;
        let attempts = self.max_attempts.min(span);

        let mut inner = self.inner.lock().await;
        for _ in 0..attempts {
            let candidate = inner.cursor;
            inner.cursor = if candidate >= self.range_end {
                self.range_start
            } else {
                candidate + 1
            };

            if inner.reserved.contains(&candidate) {
                trace!(port = candidate, "skipping reserved port");
                continue;
            }
            if !bind_probe(candidate) {
                trace!(port = candidate, "port taken on host, probing next");
                continue;
            }

            inner.reserved.insert(candidate);
            debug!(port = candidate, "reserved host port");
            return Ok(candidate);
        }

        Err(SandboxError::port_exhausted(
            attempts,
            self.range_start,
            self.range_end,
        ))
    }

    /// Returns a port to the pool.
    pub async fn release(&self, port: u16) {
        if self.inner.lock().await.reserved.remove(&port) {
            debug!(port, "released host port");
        }
    }

    /// Marks a port reserved without probing, for bindings the runtime chose
    /// on its own.
    pub async fn claim(&self, port: u16) {
        self.inner.lock().await.reserved.insert(port);
    }

    /// Number of currently reserved ports.
    #[allow(dead_code)] // Used by lifecycle tests
    pub async fn reserved_count(&self) -> usize {
        self.inner.lock().await.reserved.len()
    }
}

/// Checks that the host will let us bind the port right now.
fn bind_probe(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}
