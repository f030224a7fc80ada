use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::core::errors::{Result, VerseError};
use crate::core::traits::kv_store::KeyValueStore;

/// Default per-key limit, in line with typical browser storage quotas.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

/// Key-value store keeping one file per key inside a directory.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a value is replaced atomically. Temporary
/// files are created owner-readable only, which also covers the stored
/// credential.
///
/// Layout:
/// ```text
/// <data_dir>/storage/
///   token
///   app_logs
/// ```
#[derive(Clone)]
pub struct FileKvStore {
    dir: PathBuf,
    max_value_bytes: usize,
}

impl FileKvStore {
    pub fn new(dir: PathBuf, max_value_bytes: usize) -> Self {
        Self {
            dir,
            max_value_bytes,
        }
    }

    /// Map a key to its file, rejecting anything that is not a plain name.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let invalid = |reason: &str| VerseError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if key.is_empty() {
            return Err(invalid("key is empty"));
        }
        if key.starts_with('.') {
            return Err(invalid("key must not start with '.'"));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(invalid("only letters, digits, '_', '-' and '.' are allowed"));
        }

        Ok(self.dir.join(key))
    }

    fn storage_error(key: &str, action: &str, e: impl std::fmt::Display) -> VerseError {
        VerseError::Storage {
            key: key.to_string(),
            detail: format!("{action}: {e}"),
        }
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error(key, "read failed", e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if value.len() > self.max_value_bytes {
            return Err(VerseError::StorageQuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                limit: self.max_value_bytes,
            });
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| Self::storage_error(key, "cannot create storage directory", e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| Self::storage_error(key, "cannot create temporary file", e))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| Self::storage_error(key, "write failed", e))?;
        tmp.persist(&path)
            .map_err(|e| Self::storage_error(key, "cannot replace value", e.error))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(key, "remove failed", e)),
        }
    }
}
