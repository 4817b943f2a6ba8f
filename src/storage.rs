//! Key-value persistence for the shared flags and the credential.
//!
//! Format: a single JSON object, e.g.
//! `{"extensionEnabled": true, "habitModeEnabled": false, "apiKey": "..."}`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InputEverywhereError, Result};
use crate::state::keys;

/// Durable key-value storage shared by every context.
///
/// Implementations use interior mutability so one store can be shared
/// behind an `Arc` by the coordinator, the pages and the control panel.
pub trait StateStore: Send + Sync {
    /// Read one key. `None` means absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write several keys at once.
    fn set_many(&self, entries: &[(&str, Value)]) -> Result<()>;

    /// Stored credential, if any non-empty one exists.
    fn api_key(&self) -> Option<String> {
        self.get(keys::API_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty())
    }

    fn set_api_key(&self, api_key: &str) -> Result<()> {
        self.set_many(&[(keys::API_KEY, Value::String(api_key.to_string()))])
    }
}

/// In-memory store, for tests and for contexts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<()> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// Store backed by one pretty-printed JSON file.
///
/// The whole object is cached in memory and rewritten on every `set_many`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Open a store. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| {
                InputEverywhereError::Storage {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!(path = %path.display(), "Storage file not found, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open a store, falling back to an empty one when the file is unreadable.
    /// The next write replaces the unreadable file.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable storage, starting empty");
                Self {
                    path,
                    entries: Mutex::new(BTreeMap::new()),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        let io_err = |source| InputEverywhereError::Storage {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<()> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.write(&map)
    }
}

/// Default storage location (~/.input-everywhere/storage.json)
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".input-everywhere").join("storage.json"))
        .unwrap_or_else(|| std::env::temp_dir().join("input-everywhere-storage.json"))
}
