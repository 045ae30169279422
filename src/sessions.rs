//! Owner-to-sandbox session bookkeeping.
//!
//! One entry per owner at all times. The registry only learns about a sandbox
//! once it is Ready, and forgets it when it is torn down. All mutation goes
//! through a single mutex, so a slow provision and a fast terminate for the
//! same owner cannot interleave into two recorded sandboxes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// An owner's currently active sandbox.
#[derive(Debug, Clone)]
pub(crate) struct SessionEntry {
    pub sandbox_id: String,
    pub endpoint: String,
    pub registered_at: DateTime<Utc>,
}

/// In-memory map from owner id to their active sandbox.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `sandbox_id` as the owner's active sandbox. Returns the entry
    /// it replaced, if the owner already had one.
    pub async fn register(
        &self,
        owner: &str,
        sandbox_id: &str,
        endpoint: &str,
    ) -> Option<SessionEntry> {
        self.entries.lock().await.insert(
            owner.to_string(),
            SessionEntry {
                sandbox_id: sandbox_id.to_string(),
                endpoint: endpoint.to_string(),
                registered_at: Utc::now(),
            },
        )
    }

    /// The owner's active sandbox, if any.
    #[allow(dead_code)] // Public API for callers
    pub async fn lookup(&self, owner: &str) -> Option<SessionEntry> {
        self.entries.lock().await.get(owner).cloned()
    }

    /// Removes the owner's entry, returning it if present.
    #[allow(dead_code)] // Public API for callers
    pub async fn remove_owner(&self, owner: &str) -> Option<SessionEntry> {
        self.entries.lock().await.remove(owner)
    }

    /// Removes whichever entry points at `sandbox_id`. Teardown only knows
    /// the sandbox id, not the owner.
    pub async fn remove_sandbox(&self, sandbox_id: &str) -> Option<(String, SessionEntry)> {
        let mut entries = self.entries.lock().await;
        let owner = entries
            .iter()
            .find(|(_, entry)| entry.sandbox_id == sandbox_id)
            .map(|(owner, _)| owner.clone())?;
        let entry = entries.remove(&owner)?;
        Some((owner, entry))
    }

    /// Number of active entries.
    #[allow(dead_code)] // Used by lifecycle tests
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
