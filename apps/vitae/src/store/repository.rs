//! Persistence seam for the document collection.
//!
//! The collection is stored the way a browser key-value store would hold it:
//! one JSON object of namespaced keys, with the whole collection serialized
//! under [`STORAGE_KEY`]. Other keys in the file are left alone on write.

use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::SavedDocument;

/// Namespaced key the collection is stored under.
pub const STORAGE_KEY: &str = "cv-data";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize documents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored data is malformed: {0}")]
    Parse(String),

    #[error("Invalid document patch: {0}")]
    InvalidPatch(String),
}

/// Load/save contract for the full document collection.
///
/// `load` returns an empty vector when nothing has been stored yet. Callers
/// own the fallback policy for empty or malformed data.
pub trait DocumentRepository: Send + Sync {
    fn load(&self) -> Result<Vec<SavedDocument>, StoreError>;
    fn save(&self, documents: &[SavedDocument]) -> Result<(), StoreError>;
    /// Removes every key this repository owns.
    fn clear(&self) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file
// ────────────────────────────────────────────────────────────────────────────

/// Key-value JSON file on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Parse(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Writes through a sibling temp file so a crash never leaves a truncated store.
    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl DocumentRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<SavedDocument>, StoreError> {
        let mut entries = self.read_entries()?;
        match entries.remove(STORAGE_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => {
                let documents = serde_json::from_value(Value::Array(items))
                    .map_err(|e| StoreError::Parse(e.to_string()))?;
                Ok(documents)
            }
            Some(other) => Err(StoreError::Parse(format!(
                "'{STORAGE_KEY}' must be an array, found {}",
                json_kind(&other)
            ))),
        }
    }

    fn save(&self, documents: &[SavedDocument]) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future save.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(documents)?);
        self.write_entries(&entries)?;
        debug!(
            path = %self.path.display(),
            documents = documents.len(),
            "Persisted document collection"
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(STORAGE_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory fake
// ────────────────────────────────────────────────────────────────────────────

/// Repository holding the serialized collection in memory.
///
/// Clones share the same slot, so a test can keep one handle and inspect what
/// the store persisted through the other. Data goes through a JSON string to
/// exercise the same serialization as the file repository.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    slot: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

#[cfg(test)]
impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with raw stored text, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
            ..Self::default()
        }
    }

    /// Makes every later `save` and `clear` fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory repository is read-only",
            )));
        }
        Ok(())
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }
}

#[cfg(test)]
impl DocumentRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<SavedDocument>, StoreError> {
        let raw = self.raw();
        match raw {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Parse(e.to_string())),
        }
    }

    fn save(&self, documents: &[SavedDocument]) -> Result<(), StoreError> {
        self.check_writable()?;
        let raw = serde_json::to_string(documents)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Parse("memory repository lock poisoned".to_string()))?;
        *slot = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Parse("memory repository lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
