//! Storage for the recently-used tools list, with TTL pruning on load.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::RecentTools;
use crate::util::persistence::{default_data_dir, load_json, save_json, PersistError};

const RECENT_FILENAME: &str = "recent_tools.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist recent tools: {0}")]
    Persist(#[from] PersistError),
    #[error("recent tools store lock poisoned")]
    Poisoned,
}

/// Where the recently-used list lives between runs.
pub trait RecentToolsStore: Send + Sync {
    fn load(&self) -> Result<RecentTools, StoreError>;
    fn save(&self, tools: &RecentTools) -> Result<(), StoreError>;
}

/// JSON document on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `recent_tools.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(RECENT_FILENAME))
    }

    /// `recent_tools.json` in the platform data directory.
    pub fn in_default_dir() -> Result<Self, StoreError> {
        let dir = default_data_dir().ok_or(PersistError::StorageUnavailable)?;
        Ok(Self::in_dir(&dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecentToolsStore for JsonFileStore {
    fn load(&self) -> Result<RecentTools, StoreError> {
        let tools = load_json::<RecentTools>(&self.path)?.unwrap_or_default();
        debug!(
            target: "recent_tools",
            path = %self.path.display(),
            entries = tools.entries().len(),
            "loaded recent tools"
        );
        Ok(tools)
    }

    fn save(&self, tools: &RecentTools) -> Result<(), StoreError> {
        save_json(&self.path, tools)?;
        debug!(
            target: "recent_tools",
            path = %self.path.display(),
            entries = tools.entries().len(),
            "saved recent tools"
        );
        Ok(())
    }
}

/// Process-local store, for `--no-persist` and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<RecentTools>,
}

impl RecentToolsStore for MemoryStore {
    fn load(&self) -> Result<RecentTools, StoreError> {
        self.inner
            .lock()
            .map(|tools| tools.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, tools: &RecentTools) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = tools.clone();
        Ok(())
    }
}

/// Load and prune. Failures are logged and degrade to an empty list.
pub fn load_recent(store: &dyn RecentToolsStore, now_ms: i64) -> RecentTools {
    let mut tools = match store.load() {
        Ok(tools) => tools,
        Err(err) => {
            warn!(target: "recent_tools", error = %err, "failed to load recent tools");
            return RecentTools::default();
        }
    };

    if tools.prune(now_ms) {
        info!(
            target: "recent_tools",
            remaining = tools.entries().len(),
            "pruned expired recent tools"
        );
        save_recent(store, &tools);
    }
    tools
}

/// Save, logging rather than returning failures.
pub fn save_recent(store: &dyn RecentToolsStore, tools: &RecentTools) {
    if let Err(err) = store.save(tools) {
        warn!(target: "recent_tools", error = %err, "failed to save recent tools");
    }
}
