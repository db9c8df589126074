//! File-Backed Name/Value Store
//!
//! A durable name/value store for hosts outside a browser: the whole store
//! lives in one JSON object on disk and survives process restarts.
//!
//! ## Write Path
//!
//! Every mutation rewrites the file through a temporary file in the same
//! directory followed by a rename, so a crash mid-write leaves either the
//! old or the new contents, never a torn file.

use super::memory::{bytes_after_write, DEFAULT_QUOTA_BYTES};
use super::NameValueStore;
use crate::error::MediumError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: RwLock<BTreeMap<String, String>>,
    quota: usize,
}

impl FileStore {
    /// Opens the store at `path`, creating it on first write if missing.
    ///
    /// Fails if the file exists but does not hold a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MediumError> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), items = items.len(), "File store opened");

        Ok(Self {
            path,
            items: RwLock::new(items),
            quota: DEFAULT_QUOTA_BYTES,
        })
    }

    /// Sets the byte quota for keys plus values.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), MediumError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, items)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn persist_or_warn(&self, items: &BTreeMap<String, String>) {
        if let Err(err) = self.persist(items) {
            warn!(path = %self.path.display(), error = %err, "Failed to persist file store");
        }
    }
}

impl NameValueStore for FileStore {
    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.items.read().keys().nth(index).cloned()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), MediumError> {
        let mut items = self.items.write();

        let needed = bytes_after_write(&items, key, value);
        if needed > self.quota {
            return Err(MediumError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist(&items) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(err);
        }

        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.write();
        if items.remove(key).is_some() {
            self.persist_or_warn(&items);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }
}
