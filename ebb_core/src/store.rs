//! Key-value persistence the tracker reads and writes through.
//!
//! Two embeddings are provided: an in-memory map for tests and embedding
//! callers, and a single JSON file with file locking for the CLI.
//!
//! Corrupt data never propagates as an error: unreadable files and values
//! that fail to parse are logged and treated as absent.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Minimal key-value contract: string keys, string (JSON) values
pub trait RecordStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Load and parse a JSON value, treating malformed data as absent
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    let raw = store.load(key)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Malformed value under {:?}: {}. Treating as unset.", key, e);
            None
        }
    }
}

/// Serialize a value to JSON and save it under `key`
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: RecordStore + ?Sized,
{
    let contents = serde_json::to_string(value)?;
    store.save(key, &contents)
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// File store
// ============================================================================

/// All keys in one JSON object file, `{"key": "value", ...}`
#[derive(Clone, Debug)]
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

    /// Read every entry with a shared lock
    ///
    /// Returns an empty map if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty map.
    fn read_entries(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            tracing::debug!("No store file at {:?}, starting empty", self.path);
            return BTreeMap::new();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open store file {:?}: {}. Treating as empty.", self.path, e);
                return BTreeMap::new();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock store file {:?}: {}. Treating as empty.", self.path, e);
            return BTreeMap::new();
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();

        if let Err(e) = read {
            tracing::warn!("Failed to read store file {:?}: {}. Treating as empty.", self.path, e);
            return BTreeMap::new();
        }

        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to parse store file {:?}: {}. Treating as empty.", self.path, e);
                BTreeMap::new()
            }
        }
    }

    /// Atomically replace the store file
    ///
    /// Writes to a temp file in the same directory under an exclusive lock,
    /// syncs it, then renames it over the original.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => return Err(Error::Store(format!("store path {:?} has no parent", self.path))),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(entries)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} store entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
