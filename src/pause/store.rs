//! Pause notifiers
//!
//! `PauseStore` persists the paused state with atomic writes; `PauseSlot`
//! keeps it in memory for callers that resume within the same process.

use super::types::PausedState;
use super::PauseNotifier;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// In-memory pause notifier
#[derive(Debug, Default)]
pub struct PauseSlot {
    state: Mutex<Option<PausedState>>,
}

impl PauseSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the paused state out of the slot
    pub async fn take(&self) -> Option<PausedState> {
        self.state.lock().await.take()
    }

    /// Check if a walk was paused into this slot
    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.is_some()
    }
}

#[async_trait]
impl PauseNotifier for PauseSlot {
    async fn on_pause(&self, state: PausedState) -> Result<()> {
        *self.state.lock().await = Some(state);
        Ok(())
    }
}

/// JSON file holding the paused state between runs
#[derive(Debug, Clone)]
pub struct PauseStore {
    /// Path to the pause file
    path: PathBuf,
}

impl PauseStore {
    /// Create a store for the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the pause file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the paused state, replacing any previous one
    pub async fn save(&self, state: &PausedState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state).map_err(|e| Error::State {
            message: format!("Failed to serialize paused state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write pause file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename pause file: {e}"),
            })?;

        Ok(())
    }

    /// Load the paused state, `None` if no walk is paused
    pub async fn load(&self) -> Result<Option<PausedState>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to read pause file: {e}"),
            })?;

        let state: PausedState = serde_json::from_str(&contents).map_err(|e| Error::State {
            message: format!("Failed to parse pause file: {e}"),
        })?;
        state.validate()?;

        Ok(Some(state))
    }

    /// Load the paused state, failing if there is none
    pub async fn load_required(&self) -> Result<PausedState> {
        self.load().await?.ok_or_else(|| Error::FileNotFound {
            path: self.path.display().to_string(),
        })
    }

    /// Remove the pause file once the walk has completed
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::State {
                message: format!("Failed to remove pause file: {e}"),
            }),
        }
    }
}

#[async_trait]
impl PauseNotifier for PauseStore {
    async fn on_pause(&self, state: PausedState) -> Result<()> {
        self.save(&state).await?;
        info!(
            "Paused {} retrieval, state written to {}",
            state.object_type,
            self.path.display()
        );
        Ok(())
    }
}
