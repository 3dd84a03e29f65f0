//! String key-value storage
//!
//! Values are JSON documents. `MemoryStore` backs tests and runs where no data
//! directory is available; `FileStore` keeps one `<key>.json` per key.

use crate::error::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Reads and parses the JSON stored under `key`
pub(crate) fn read_json<K, T>(store: &K, key: &str) -> StorageResult<Option<T>>
where
    K: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Reads a shared record that is about to be rewritten
///
/// A corrupt value is copied to `<key>_corrupt` before an empty record is
/// returned, so other books' entries survive the overwrite in raw form. If the
/// copy cannot be written the error is returned and nothing is overwritten.
pub(crate) fn read_json_for_update<K, T>(store: &K, key: &str) -> StorageResult<T>
where
    K: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    match read_json(store, key) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(StorageError::Corrupt { .. }) => {
            let backup = format!("{}_corrupt", key);
            if let Some(raw) = store.get(key)? {
                store.set(&backup, &raw)?;
            }
            log::warn!(
                "'{}' is unreadable and will be replaced, dropping every other book's entries; \
                 the old value is kept under '{}'",
                key,
                backup
            );
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn write_json<K, T>(store: &K, key: &str, value: &T) -> StorageResult<()>
where
    K: KeyValueStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        let mut guard = self.values.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn len(&self) -> usize {
        self.with_values(|values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.with_values(|values| values.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.with_values(|values| values.insert(key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.with_values(|values| values.remove(key));
        Ok(())
    }
}

/// Directory of JSON files, written atomically through a temp file
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> StorageResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
                path: self.dir.clone(),
                source,
            })?;
            log::info!("Created state directory: {}", self.dir.display());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        self.ensure_dir()?;

        let write_error = |source| StorageError::Write {
            path: path.clone(),
            source,
        };
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        temp_file.write_all(value.as_bytes()).map_err(write_error)?;
        temp_file.flush().map_err(write_error)?;
        temp_file
            .persist(&path)
            .map_err(|e| write_error(e.error))?;

        log::debug!("Stored '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }
}
