//! # State Stores
//!
//! Injectable persistence backends for the bus. A store only knows how to
//! load and save whole snapshots; all state logic lives in [`super::bus`].

use super::types::BusState;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Full-snapshot persistence contract.
///
/// `save` must make the snapshot durable before returning: a crash after a
/// successful save never loses it, and a crash during save leaves the last
/// fully written snapshot intact.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<Option<BusState>>;
    fn save(&self, state: &BusState) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<BusState>> {
        (**self).load()
    }

    fn save(&self, state: &BusState) -> Result<()> {
        (**self).save(state)
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<BusState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot.
    pub fn with_state(state: BusState) -> Self {
        Self {
            slot: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<BusState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &BusState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

/// JSON-document store: one file per session.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<BusState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {:?}", self.path))?;
        let state = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse state file: {:?}", self.path))?;
        Ok(Some(state))
    }

    fn save(&self, state: &BusState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create state directory: {:?}", parent))?;
            }
        }
        let data = serde_json::to_string_pretty(state)?;
        // Write the whole document to a sibling file, then rename over the
        // old one, so readers only ever see a complete snapshot.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)
            .with_context(|| format!("Failed to write state file: {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {:?}", self.path))?;
        Ok(())
    }
}
