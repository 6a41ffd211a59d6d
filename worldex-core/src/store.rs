//! Persistence for the canonical store.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::{CanonicalStore, WorldexError};

/// Load/save collaborator for the canonical store.
pub trait RecordStore: Send + Sync {
    /// Load the current snapshot. A missing snapshot is an empty store.
    ///
    /// # Errors
    /// Returns `StoreCorrupt` if a snapshot exists but cannot be parsed.
    fn load(&self) -> Result<CanonicalStore, WorldexError>;

    /// Persist `store` fully or not at all.
    ///
    /// # Errors
    /// Returns `StoreUnwritable` if the snapshot could not be written.
    fn save(&self, store: &CanonicalStore) -> Result<(), WorldexError>;

    /// Location shown in logs and errors.
    fn describe(&self) -> String;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unwritable(&self, e: impl std::fmt::Display) -> WorldexError {
        WorldexError::store_unwritable(self.path.display().to_string(), e.to_string())
    }
}

impl RecordStore for JsonFileStore {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_core::store::load",
            skip(self),
            fields(path = %self.path.display()),
        )
    )]
    fn load(&self) -> Result<CanonicalStore, WorldexError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CanonicalStore::new()),
            Err(e) => {
                return Err(WorldexError::store_corrupt(
                    self.path.display().to_string(),
                    e.to_string(),
                ));
            }
        };
        serde_json::from_str(&text)
            .map_err(|e| WorldexError::store_corrupt(self.path.display().to_string(), e.to_string()))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_core::store::save",
            skip(self, store),
            fields(path = %self.path.display(), countries = store.len()),
        )
    )]
    fn save(&self, store: &CanonicalStore) -> Result<(), WorldexError> {
        let json = serde_json::to_vec_pretty(store).map_err(|e| self.unwritable(e))?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.unwritable(e))?;

        // The temp file lives next to the target so the final rename stays on one filesystem.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.unwritable(e))?;
        tmp.write_all(&json).map_err(|e| self.unwritable(e))?;
        tmp.as_file().sync_all().map_err(|e| self.unwritable(e))?;
        tmp.persist(&self.path).map_err(|e| self.unwritable(e.error))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<CanonicalStore>,
}

impl MemoryStore {
    /// Store seeded with `initial`.
    #[must_use]
    pub fn new(initial: CanonicalStore) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Current contents.
    ///
    /// # Errors
    /// Returns `Other` if the lock is poisoned.
    pub fn snapshot(&self) -> Result<CanonicalStore, WorldexError> {
        self.load()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<CanonicalStore, WorldexError> {
        self.inner
            .lock()
            .map(|g| g.clone())
            .map_err(|e| WorldexError::Other(e.to_string()))
    }

    fn save(&self, store: &CanonicalStore) -> Result<(), WorldexError> {
        let mut g = self
            .inner
            .lock()
            .map_err(|e| WorldexError::store_unwritable("memory", e.to_string()))?;
        *g = store.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
