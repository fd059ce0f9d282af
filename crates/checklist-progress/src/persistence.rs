//! Local persistence
//!
//! The store caches each instance's completion snapshot under
//! `checklist_<instanceId>_completion` through a [`PersistenceAdapter`].
//! The cache is an offline fallback only; backend data wins on load.
//!
//! # Adapters
//! - [`MemoryAdapter`]: in-process map, shared between clones
//! - [`FileAdapter`]: one JSON file per key in a directory

use crate::error::PersistenceError;
use checklist_model::{CompletionRecord, ProgressSnapshot};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key for an instance's completion snapshot
#[inline]
#[must_use]
pub fn storage_key(instance_id: u64) -> String {
    format!("checklist_{instance_id}_completion")
}

/// Byte-oriented key-value storage
#[cfg_attr(test, mockall::automock)]
pub trait PersistenceAdapter: Send + Sync {
    /// Stored bytes for `key`, or `None` when nothing is stored
    ///
    /// # Errors
    /// Backend-specific read failures.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Store `bytes` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Backend-specific write failures.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;

    /// Remove `key`; removing a missing key succeeds
    ///
    /// # Errors
    /// Backend-specific delete failures.
    fn clear(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Encode a snapshot for storage
///
/// # Errors
/// [`PersistenceError::Encode`] if serialization fails.
pub fn encode_snapshot(snapshot: &[CompletionRecord]) -> Result<Vec<u8>, PersistenceError> {
    Ok(serde_json::to_vec(snapshot)?)
}

/// Decode stored bytes into a map keyed by item id text
///
/// Corrupt data is logged and treated as absent.
#[must_use]
pub fn decode_snapshot(bytes: &[u8]) -> HashMap<String, CompletionRecord> {
    match serde_json::from_slice::<ProgressSnapshot>(bytes) {
        Ok(records) => records
            .into_iter()
            .map(|record| (record.item_id.as_text().into_owned(), record))
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to parse cached completion data: {}", e);
            HashMap::new()
        }
    }
}

/// In-memory adapter
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryAdapter {
    /// Create empty adapter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether `key` holds a value
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.inner.lock().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.inner.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), PersistenceError> {
        self.inner.lock().remove(key);
        Ok(())
    }
}

/// Directory-backed adapter: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileAdapter {
    dir: PathBuf,
}

impl FileAdapter {
    /// Create adapter rooted at `dir`; the directory is created on first save
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl PersistenceAdapter for FileAdapter {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        // Write-then-rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}
