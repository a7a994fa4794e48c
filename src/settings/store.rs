//! Key-value persistence behind the settings document.
//!
//! `set` only touches memory; nothing reaches disk until `save`. Handlers may
//! interleave at any store await, so file saves are serialized: each one
//! snapshots and renames under a single lock, and the last save to finish
//! always carries the newest snapshot.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings file must hold a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Settings backend unavailable: {0}")]
    Backend(String),
}

/// Async get/set/save over string-valued keys.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn save(&self) -> Result<(), StoreError>;
}

/// Settings document stored as a JSON object on disk, loaded on first use.
pub struct JsonFileStore {
    path: PathBuf,
    entries: tokio::sync::Mutex<Option<Map<String, Value>>>,
    /// Held from snapshot through rename; the temp file is shared.
    save_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: tokio::sync::Mutex::new(None),
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<Map<String, Value>, StoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[SETTINGS] No settings at {} — starting empty", path.display());
                return Ok(Map::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            Value::Array(_) => Err(StoreError::NotAnObject("an array")),
            Value::String(_) => Err(StoreError::NotAnObject("a string")),
            Value::Number(_) => Err(StoreError::NotAnObject("a number")),
            Value::Bool(_) => Err(StoreError::NotAnObject("a boolean")),
            Value::Null => Err(StoreError::NotAnObject("null")),
        }
    }

    /// Run `f` against the in-memory document, loading it first if needed.
    async fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut Map<String, Value>) -> R,
    ) -> Result<R, StoreError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(Self::load(&self.path).await?);
        }
        match guard.as_mut() {
            Some(entries) => Ok(f(entries)),
            None => Err(StoreError::Backend("settings document not loaded".into())),
        }
    }
}

impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries| match entries.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                log::warn!("[SETTINGS] Ignoring non-string value for '{}': {}", key, other);
                None
            }
            None => None,
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        })
        .await
    }

    async fn save(&self) -> Result<(), StoreError> {
        let _saving = self.save_lock.lock().await;
        let json = self
            .with_entries(|entries| serde_json::to_string_pretty(&*entries))
            .await??;

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        // Write beside the target, then rename over it.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&tmp, json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;

        log::debug!("[SETTINGS] Saved {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    pending: BTreeMap<String, String>,
    saved: BTreeMap<String, String>,
    saves: usize,
}

/// In-memory store with a visible flush boundary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose document already holds `entries`, as if read from disk.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                pending: map.clone(),
                saved: map,
                saves: 0,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Contents as of the last `save`.
    pub fn saved(&self) -> BTreeMap<String, String> {
        self.state().saved.clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.state().saves
    }
}

impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state().pending.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.state()
            .pending
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let mut state = self.state();
        let snapshot = state.pending.clone();
        state.saved = snapshot;
        state.saves += 1;
        Ok(())
    }
}
