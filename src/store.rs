use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

pub const DATA_DIR: &str = "data";

// String-keyed, string-valued persistent storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

// One JSON file per key: <dir>/<key>.json
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonDirStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)?;
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Outcome of a mutation's write-back.
///
/// The in-memory snapshot has already changed by the time this is
/// returned; `Failed` only means the change is not durable.
#[derive(Debug)]
pub enum Persisted {
    Saved,
    Unchanged,
    Failed(AppError),
}

impl Persisted {
    #[cfg(test)]
    pub fn is_saved(&self) -> bool {
        matches!(self, Persisted::Saved)
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            Persisted::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

/// Read `key` and decode it, falling back to `T::default()` when the
/// record is absent, unreadable or malformed.
pub fn load_or_default<T>(kv: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let text = match kv.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!(key = key, "no stored record, using defaults");
            return T::default();
        }
        Err(e) => {
            tracing::warn!(key = key, error = %e, "failed to read stored record, using defaults");
            return T::default();
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key = key, error = %e, "malformed stored record, using defaults");
            T::default()
        }
    }
}

pub fn save<T: Serialize>(kv: &dyn KeyValueStore, key: &str, value: &T) -> Persisted {
    let result = serde_json::to_string_pretty(value)
        .map_err(AppError::from)
        .and_then(|text| kv.set(key, &text).map_err(AppError::from));

    match result {
        Ok(()) => {
            tracing::debug!(key = key, "record saved");
            Persisted::Saved
        }
        Err(e) => {
            tracing::warn!(key = key, error = %e, "failed to save record");
            Persisted::Failed(e)
        }
    }
}
