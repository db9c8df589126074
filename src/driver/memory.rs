//! Memory Driver
//!
//! Keeps entries in a process-local map that is never persisted. It is
//! always supported, which makes it the universal fallback and the only
//! driver used in non-browser contexts.
//!
//! Shadow entries live in a sibling map keyed by the companion key, and are
//! listed back under their `<key>.___exp` names.

use super::{companion_key, shadow_key, Driver, DriverKind};
use crate::runtime::Runtime;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Maps {
    values: HashMap<String, String>,
    /// Companion key -> stored expiry
    expiries: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct MemoryDriver {
    maps: RwLock<Maps>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for MemoryDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Memory
    }

    fn is_supported(_runtime: &Runtime) -> bool {
        true
    }

    fn raw_get(&self, key: &str) -> Option<String> {
        let maps = self.maps.read();
        match companion_key(key) {
            Some(companion) => maps.expiries.get(companion).cloned(),
            None => maps.values.get(key).cloned(),
        }
    }

    fn raw_set(&self, key: &str, value: &str) -> bool {
        let mut maps = self.maps.write();
        match companion_key(key) {
            Some(companion) => maps.expiries.insert(companion.to_string(), value.to_string()),
            None => maps.values.insert(key.to_string(), value.to_string()),
        };
        true
    }

    fn raw_remove(&self, key: &str) -> bool {
        let mut maps = self.maps.write();
        match companion_key(key) {
            Some(companion) => maps.expiries.remove(companion).is_some(),
            None => maps.values.remove(key).is_some(),
        }
    }

    fn raw_has(&self, key: &str) -> bool {
        let maps = self.maps.read();
        match companion_key(key) {
            Some(companion) => maps.expiries.contains_key(companion),
            None => maps.values.contains_key(key),
        }
    }

    fn raw_keys(&self) -> Vec<String> {
        let maps = self.maps.read();
        maps.values
            .keys()
            .cloned()
            .chain(maps.expiries.keys().map(|k| shadow_key(k)))
            .collect()
    }

    fn raw_len(&self) -> usize {
        let maps = self.maps.read();
        maps.values.len() + maps.expiries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_and_shadows_are_separate() {
        let driver = MemoryDriver::new();

        assert!(driver.raw_set("k", "\"v\""));
        assert!(driver.raw_set("k.___exp", "123"));

        assert_eq!(driver.raw_get("k"), Some("\"v\"".to_string()));
        assert_eq!(driver.raw_get("k.___exp"), Some("123".to_string()));

        let mut keys = driver.raw_keys();
        keys.sort();
        assert_eq!(keys, vec!["k".to_string(), "k.___exp".to_string()]);
        assert_eq!(driver.raw_len(), 2);

        assert!(driver.raw_remove("k"));
        assert!(driver.raw_has("k.___exp"));
        assert!(!driver.raw_remove("k"));
    }

    #[test]
    fn test_always_supported() {
        assert!(MemoryDriver::is_supported(&Runtime::server()));
        assert!(MemoryDriver::is_supported(&Runtime::browser()));
    }
}
