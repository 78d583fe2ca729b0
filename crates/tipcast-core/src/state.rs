//! Resume state — the only data that must survive a restart.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Where the notifier left off: the last accepted block hash and the
/// transaction ids already broadcast in that block's cycle.
///
/// `broadcast_txids` is always a subset of the transactions belonging to
/// the `last_block_hash` cycle; it is cleared exactly when a new block is
/// accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeState {
    pub last_block_hash: Option<String>,
    #[serde(default)]
    pub broadcast_txids: HashSet<String>,
}

impl ResumeState {
    /// Accept a new block: record its hash and clear the dedup set.
    pub fn accept_block(&mut self, hash: impl Into<String>) {
        self.last_block_hash = Some(hash.into());
        self.broadcast_txids.clear();
    }
}

/// Durable storage for [`ResumeState`]. Loaded once before polling starts,
/// saved whenever a tick changes the state.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn load(&self) -> Result<ResumeState, StateError>;
    async fn save(&self, state: &ResumeState) -> Result<(), StateError>;
}

/// In-memory store — used by tests and `--ephemeral` runs, where duplicate
/// events after a restart are acceptable.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<ResumeState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ResumeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<ResumeState, StateError> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &ResumeState) -> Result<(), StateError> {
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_block_resets_dedup_set() {
        let mut state = ResumeState::default();
        state.broadcast_txids.insert("t1".into());
        state.accept_block("00ab");
        assert_eq!(state.last_block_hash.as_deref(), Some("00ab"));
        assert!(state.broadcast_txids.is_empty());
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let mut state = ResumeState::default();
        state.accept_block("00ab");
        state.broadcast_txids.insert("t1".into());
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.last_block_hash.as_deref(), Some("00ab"));
        assert!(loaded.broadcast_txids.contains("t1"));
    }
}
