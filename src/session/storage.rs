//! Session state persistence
//!
//! This module defines the storage contract for saving and reloading a
//! [`FlowState`] between interactions, keyed by session id. State crosses
//! the boundary as JSON so any backing store (database row, cache entry,
//! file) can hold it without pinning execution context. The in-memory
//! implementation backs tests and the console driver; deployments plug in
//! their own store behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::flow::FlowState;
use crate::utils::errors::Result;

/// Save/load contract for per-session flow state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist a session's state, replacing any previous snapshot
    async fn save(&self, state: &FlowState) -> Result<()>;

    /// Load a session's state, or `None` when the session is unknown
    async fn load(&self, session_id: Uuid) -> Result<Option<FlowState>>;

    /// Drop a session's state. Deleting an unknown session is a no-op.
    async fn delete(&self, session_id: Uuid) -> Result<()>;

    /// Ids of all sessions currently persisted
    async fn active_sessions(&self) -> Result<Vec<Uuid>>;
}

/// In-memory state store holding JSON snapshots
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    // Serialized snapshots: keeps the JSON contract honest and hands every
    // loader its own copy.
    entries: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn save(&self, state: &FlowState) -> Result<()> {
        let snapshot = serde_json::to_string(state)?;
        debug!(
            session_id = %state.session_id,
            flow_id = %state.flow_id,
            bytes = snapshot.len(),
            "Saving session state"
        );
        self.entries
            .write()
            .await
            .insert(state.session_id, snapshot);
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<FlowState>> {
        let entries = self.entries.read().await;
        match entries.get(&session_id) {
            Some(snapshot) => Ok(Some(serde_json::from_str(snapshot)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: Uuid) -> Result<()> {
        let removed = self.entries.write().await.remove(&session_id).is_some();
        debug!(session_id = %session_id, removed = removed, "Deleted session state");
        Ok(())
    }

    async fn active_sessions(&self) -> Result<Vec<Uuid>> {
        Ok(self.entries.read().await.keys().copied().collect())
    }
}
