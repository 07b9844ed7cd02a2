//! Session-scoped persistence of the current PiP owner.
//!
//! A single key, written through on every ownership change and cleared
//! when ownership goes back to idle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use pip_common::{StoreError, TabId};
use serde::{Deserialize, Serialize};

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<TabId>, StoreError>;
    fn save(&self, owner: TabId) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<TabId>, StoreError> {
        (**self).load()
    }

    fn save(&self, owner: TabId) -> Result<(), StoreError> {
        (**self).save(owner)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    owner: Mutex<Option<TabId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<TabId>, StoreError> {
        Ok(*self.owner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, owner: TabId) -> Result<(), StoreError> {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = Some(owner);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// On-disk record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedOwner {
    owner: TabId,
    /// RFC 3339, for humans reading the file.
    saved_at: String,
}

/// JSON file store. The file exists only while someone owns PiP.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache_dir>/pipkeeper/session.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("pipkeeper").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<TabId>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: PersistedOwner = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", self.path.display())))?;
        Ok(Some(record.owner))
    }

    fn save(&self, owner: TabId) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = PersistedOwner {
            owner,
            saved_at: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
