//! Persistence gateway.
//!
//! The core sees storage as a key-value store of JSON documents. The
//! file-backed store keeps one document per key with file locking and
//! atomic replacement so a crash mid-write never leaves a torn file.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const WORKOUTS_KEY: &str = "gymsync.workouts";
pub const PLANS_KEY: &str = "gymsync.plans";
pub const PROFILE_KEY: &str = "gymsync.profile";
pub const UNITS_KEY: &str = "gymsync.units";

/// Guards every document in a store directory; keys cannot start with a dot
const LOCK_FILE: &str = ".gymsync.lock";

pub trait Store {
    /// Fetch the document stored under `key`, or `None` if there is none
    fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`
    fn save(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// Load and deserialize a document, falling back to `default` when it is
/// missing or unreadable
pub fn load_or<T, S>(store: &S, key: &str, default: T) -> Result<T>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let Some(value) = store.load(key)? else {
        tracing::debug!("No document for {}, using default", key);
        return Ok(default);
    };

    match serde_json::from_value::<T>(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}. Using default.", key, e);
            Ok(default)
        }
    }
}

/// Serialize and store a document
pub fn save_as<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: Store + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.save(key, &value)
}

/// In-process store, used for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<()> {
        self.documents.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid || key.starts_with('.') {
            return Err(Error::Store(format!("Invalid store key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn open_lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(file)
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        // Shared lock: readers never see a rename half way through a save
        let lock = self.open_lock()?;
        lock.lock_shared()?;

        let mut contents = String::new();
        let read = File::open(&path)
            .and_then(|file| std::io::BufReader::new(file).read_to_string(&mut contents));
        lock.unlock()?;
        read?;

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => {
                tracing::debug!("Loaded {} from {:?}", key, path);
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!("Corrupted document {:?}: {}. Ignoring it.", path, e);
                Ok(None)
            }
        }
    }

    /// Atomically writes the document by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Exclusive lock on the directory's lock file serializes writers
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(value)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;
        lock.unlock()?;

        tracing::debug!("Saved {} to {:?}", key, path);
        Ok(())
    }
}
