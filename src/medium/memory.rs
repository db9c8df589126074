//! In-Memory Name/Value Store
//!
//! A process-local stand-in for `localStorage`. Useful for hosts that have
//! no durable medium and for tests. It enforces a byte quota like a browser
//! does, and can be put in restricted mode where every write fails, which
//! is how private-browsing modes behave.

use super::NameValueStore;
use crate::error::MediumError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Default quota, matching the common browser limit of 5 MiB per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug)]
pub struct InMemoryStore {
    items: RwLock<BTreeMap<String, String>>,
    quota: usize,
    restricted: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Creates a store that rejects writes once keys plus values exceed
    /// `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            quota,
            restricted: false,
        }
    }

    /// Creates a store that is present but refuses every write.
    pub fn restricted() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            quota: 0,
            restricted: true,
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.items.read())
    }
}

pub(crate) fn used_bytes(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Bytes the map would use after writing `key = value`.
pub(crate) fn bytes_after_write(items: &BTreeMap<String, String>, key: &str, value: &str) -> usize {
    let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    used_bytes(items) - replaced + key.len() + value.len()
}

impl NameValueStore for InMemoryStore {
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
        if self.restricted {
            return Err(MediumError::SecurityError(
                "the store is read-only in this browsing mode".to_string(),
            ));
        }

        let mut items = self.items.write();
        let needed = bytes_after_write(&items, key, value);
        if needed > self.quota {
            return Err(MediumError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.write().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }
}
