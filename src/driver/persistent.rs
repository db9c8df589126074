//! Persistent Driver
//!
//! Stores entries in a durable [`NameValueStore`] (the `localStorage`
//! shape). Shadow entries are ordinary sibling items named `<key>.___exp`.
//!
//! ## Startup Sweep
//!
//! Expired entries can pile up while nothing is running, so construction
//! performs one pass over the medium: every shadow item whose deadline has
//! passed is removed together with its companion.
//!
//! ## Support Probe
//!
//! Some runtimes expose the store but throw on write (private browsing).
//! The probe therefore writes and deletes a test item instead of only
//! checking presence.

use super::{companion_key, parse_expiry, Driver, DriverKind};
use crate::medium::NameValueStore;
use crate::now_millis;
use crate::runtime::Runtime;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Item written and removed by the support probe.
pub const PROBE_KEY: &str = "___test___";

pub struct PersistentDriver {
    store: Arc<dyn NameValueStore>,
}

impl PersistentDriver {
    /// Wraps `store` and sweeps its expired entries.
    pub fn new(store: Arc<dyn NameValueStore>) -> Self {
        let driver = Self { store };
        driver.sweep_expired(now_millis());
        driver
    }

    /// Builds the driver from the runtime's store if it passes the probe.
    pub fn from_runtime(runtime: &Runtime) -> Option<Self> {
        if !Self::is_supported(runtime) {
            return None;
        }
        runtime.local_storage().map(|store| Self::new(Arc::clone(store)))
    }

    /// Writes and deletes a probe item.
    pub fn probe(store: &dyn NameValueStore) -> bool {
        match store.set_item(PROBE_KEY, "test") {
            Ok(()) => {
                store.remove_item(PROBE_KEY);
                true
            }
            Err(err) => {
                debug!(error = %err, "Persistent store rejected the probe write");
                false
            }
        }
    }

    /// Removes expired entries and their shadows. Returns `(purged, kept)`
    /// counts of shadow items.
    fn sweep_expired(&self, now: u64) -> (usize, usize) {
        let mut purged = 0;
        let mut kept = 0;

        for key in self.store.keys() {
            let Some(companion) = companion_key(&key) else {
                continue;
            };

            let expiry = self.store.get_item(&key).and_then(|raw| parse_expiry(&raw));
            match expiry {
                Some(at) if at <= now => {
                    self.store.remove_item(&key);
                    self.store.remove_item(companion);
                    purged += 1;
                }
                Some(_) => kept += 1,
                None => {}
            }
        }

        if purged > 0 || kept > 0 {
            debug!(purged, kept, "Persistent store startup sweep");
        }

        (purged, kept)
    }
}

impl fmt::Debug for PersistentDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentDriver")
            .field("items", &self.store.len())
            .finish()
    }
}

impl Driver for PersistentDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Persistent
    }

    fn is_supported(runtime: &Runtime) -> bool {
        runtime
            .local_storage()
            .is_some_and(|store| Self::probe(store.as_ref()))
    }

    fn raw_get(&self, key: &str) -> Option<String> {
        self.store.get_item(key)
    }

    fn raw_set(&self, key: &str, value: &str) -> bool {
        match self.store.set_item(key, value) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "Persistent store write failed");
                false
            }
        }
    }

    fn raw_remove(&self, key: &str) -> bool {
        let existed = self.store.get_item(key).is_some();
        self.store.remove_item(key);
        existed
    }

    fn raw_keys(&self) -> Vec<String> {
        self.store.keys()
    }

    fn raw_len(&self) -> usize {
        self.store.len()
    }
}
