//! File-backed resume state.

use std::path::PathBuf;

use async_trait::async_trait;

use tipcast_core::error::StateError;
use tipcast_core::state::{ResumeState, StateStore};

/// Stores the resume state as a single JSON document, written via a temp
/// file and rename so a crash mid-save never leaves a torn file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    /// A missing file is a fresh start, not an error.
    async fn load(&self) -> Result<ResumeState, StateError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResumeState::default()),
            Err(e) => Err(StateError::Io(e)),
        }
    }

    async fn save(&self, state: &ResumeState) -> Result<(), StateError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_default() {
        let dir = std::env::temp_dir().join("tipcast-store-missing");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let store = JsonFileStore::new(dir.join("state.json"));
        let state = store.load().await.unwrap();
        assert!(state.last_block_hash.is_none());
        assert!(state.broadcast_txids.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trip() {
        let dir = std::env::temp_dir().join("tipcast-store-roundtrip");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let store = JsonFileStore::new(dir.join("state.json"));
        let mut state = ResumeState::default();
        state.accept_block("00ab");
        state.broadcast_txids.insert("t1".into());
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.last_block_hash.as_deref(), Some("00ab"));
        assert!(loaded.broadcast_txids.contains("t1"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = std::env::temp_dir().join("tipcast-store-corrupt");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let path = dir.join("state.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().await.is_err());
    }
}
