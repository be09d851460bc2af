//! Durable client storage - a key-value string store used for the
//! favorites set and small session flags. Reads tolerate absence and
//! corruption by yielding nothing; write failures surface as errors the
//! caller logs and survives.

use crate::error::CatalogError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ONBOARDING_KEY: &str = "nestview.onboarded";

/// Key-value string store contract.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
    fn remove(&mut self, key: &str) -> Result<(), CatalogError>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), CatalogError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object per file. A missing or corrupt file
/// starts the session empty rather than failing initialization.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("store file {:?} is corrupt, starting empty: {}", path, e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    fn persist(&self) -> Result<(), CatalogError> {
        let unavailable = |key: &Path, reason: String| CatalogError::StorageUnavailable {
            key: key.display().to_string(),
            reason,
        };
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| unavailable(&self.path, e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| unavailable(&self.path, e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), CatalogError> {
        self.entries.remove(key);
        self.persist()
    }
}

/// Whether the surrounding navigation has marked onboarding as done.
pub fn has_completed_onboarding(store: &impl KeyValueStore) -> bool {
    store.get(ONBOARDING_KEY).as_deref() == Some("true")
}

pub fn mark_onboarding_complete(store: &mut impl KeyValueStore) {
    if let Err(e) = store.set(ONBOARDING_KEY, "true") {
        warn!("failed to persist onboarding flag: {}", e);
    }
}
