//! Storage Facade
//!
//! [`Storage`] is the public entry point. It picks a driver when it is
//! constructed and then routes every call through the expiration layer:
//!
//! ```text
//! Storage ──> ExpiringStore ──> Box<dyn Driver> ──> medium
//! ```
//!
//! ## Driver Selection
//!
//! 1. In a non-browser runtime the memory driver is used, whatever was asked.
//! 2. A preferred driver is used if it passes its support probe. If it does
//!    not, a warning is logged and selection continues automatically.
//! 3. Automatic selection tries persistent, then cookie, then memory, and
//!    takes the first supported one.

use super::expiration::{ExpiringStore, SweepStats};
use crate::codec::Value;
use crate::config::{CookieOptions, StorageConfig};
use crate::driver::{is_shadow_key, CookieDriver, Driver, DriverKind, MemoryDriver, PersistentDriver};
use crate::error::{StorageError, StorageResult};
use crate::medium::FileStore;
use crate::runtime::Runtime;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Unified key/value storage over the best available driver.
///
/// # Example
///
/// ```
/// use stashkv::medium::InMemoryStore;
/// use stashkv::{DriverKind, Runtime, Storage, Value};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let runtime = Runtime::browser().with_local_storage(Arc::new(InMemoryStore::new()));
/// let storage = Storage::new(&runtime);
/// assert_eq!(storage.driver_kind(), DriverKind::Persistent);
///
/// storage.set("name", "Ariz");
/// assert_eq!(storage.get("name"), Some(Value::from("Ariz")));
///
/// storage.set_with_ttl("session", "abc123", Duration::from_secs(60));
/// assert!(storage.has("session"));
/// ```
pub struct Storage {
    store: ExpiringStore,
}

impl Storage {
    /// Creates a facade over the best supported driver.
    pub fn new(runtime: &Runtime) -> Self {
        Self::with_config(runtime, &StorageConfig::default())
    }

    /// Creates a facade that prefers `preferred`, falling back automatically.
    pub fn with_driver(runtime: &Runtime, preferred: DriverKind) -> Self {
        let config = StorageConfig {
            driver: preferred,
            ..StorageConfig::default()
        };
        Self::with_config(runtime, &config)
    }

    pub fn with_config(runtime: &Runtime, config: &StorageConfig) -> Self {
        let driver = select_driver(runtime, config);
        info!(driver = %driver.kind(), "Storage driver selected");
        Self::from_driver(driver)
    }

    /// Creates a facade over exactly `kind`, without falling back.
    ///
    /// Fails with [`StorageError::UnsupportedDriver`] if the driver cannot
    /// run in `runtime`. `Auto` behaves like [`Storage::new`].
    pub fn try_with_driver(runtime: &Runtime, kind: DriverKind) -> StorageResult<Self> {
        let config = StorageConfig {
            driver: kind,
            ..StorageConfig::default()
        };
        Self::try_with_config(runtime, &config)
    }

    /// Strict variant of [`Storage::with_config`]: the configured driver
    /// is used as is, or construction fails.
    pub fn try_with_config(runtime: &Runtime, config: &StorageConfig) -> StorageResult<Self> {
        let kind = config.driver;
        if kind == DriverKind::Auto {
            return Ok(Self::with_config(runtime, config));
        }

        if !runtime.is_browser() && kind != DriverKind::Memory {
            return Err(StorageError::UnsupportedDriver(kind));
        }

        build_driver(kind, runtime, &config.cookie)
            .map(Self::from_driver)
            .ok_or(StorageError::UnsupportedDriver(kind))
    }

    /// Opens a facade over a [`FileStore`] at `path`.
    ///
    /// The file stands in for the browser's durable store, so `auto`
    /// selects the persistent driver.
    pub fn open_file(path: impl AsRef<Path>, config: &StorageConfig) -> StorageResult<Self> {
        let store = FileStore::open(path)?;
        let runtime = Runtime::browser().with_local_storage(Arc::new(store));
        Ok(Self::with_config(&runtime, config))
    }

    /// Creates a facade over a driver built by the caller.
    pub fn from_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            store: ExpiringStore::new(driver),
        }
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.store.driver_kind()
    }

    /// Reads a value. Returns `None` if the key is absent, expired, or was
    /// stored as `Undefined`.
    pub fn get(&self, key: &str) -> Option<Value> {
        if is_shadow_key(key) {
            return None;
        }

        self.store.get(key).filter(|value| !value.is_undefined())
    }

    /// Reads a value and deserializes it into `T`.
    ///
    /// Returns `None` if the key is absent or the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.get(key)?.to_json()?;
        serde_json::from_value(json)
            .map_err(|err| StorageError::Serialization(err.to_string()))
            .inspect_err(|err| debug!(key, error = %err, "Stored value does not match the requested type"))
            .ok()
    }

    /// Stores a value without expiry, replacing any previous value and TTL.
    ///
    /// Returns `false` if the key is reserved or the medium refused the write.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        self.write(key, value.into(), None)
    }

    /// Stores a value that expires after `ttl`.
    pub fn set_with_ttl(&self, key: &str, value: impl Into<Value>, ttl: Duration) -> bool {
        self.write(key, value.into(), Some(ttl))
    }

    fn write(&self, key: &str, value: Value, ttl: Option<Duration>) -> bool {
        if let Err(err) = validate_key(key) {
            warn!(error = %err, "Rejected write");
            return false;
        }

        self.store.set(key, &value, ttl)
    }

    /// Returns true if the key holds a live entry (even an `Undefined` one).
    pub fn has(&self, key: &str) -> bool {
        !is_shadow_key(key) && self.store.has(key)
    }

    /// Removes one entry. Returns true if it existed.
    pub fn remove(&self, key: &str) -> bool {
        !is_shadow_key(key) && self.store.remove(key)
    }

    /// Removes every entry. Returns true if anything was removed.
    pub fn remove_all(&self) -> bool {
        self.store.remove_all()
    }

    /// Same as [`Storage::remove_all`].
    pub fn empty(&self) -> bool {
        self.remove_all()
    }

    /// All live keys.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining time to live of `key`, or `None` if it has no expiry or
    /// does not exist.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        if !self.has(key) {
            return None;
        }
        let remaining = self
            .store
            .expires_at(key)?
            .saturating_sub(crate::now_millis());
        Some(Duration::from_millis(remaining))
    }

    /// Removes every expired entry now. Returns how many were removed.
    pub fn purge_expired(&self) -> u64 {
        self.store.purge_expired()
    }

    /// Removes every expired entry now and reports what the pass saw.
    pub fn sweep(&self) -> SweepStats {
        self.store.sweep()
    }

    /// Number of physical keys in the medium, including TTL shadows and
    /// expired entries not yet purged.
    pub fn physical_len(&self) -> usize {
        self.store.physical_len()
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("driver", &self.driver_kind())
            .finish()
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if is_shadow_key(key) {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Builds `kind` if it is supported in `runtime`.
fn build_driver(kind: DriverKind, runtime: &Runtime, cookie: &CookieOptions) -> Option<Box<dyn Driver>> {
    match kind {
        DriverKind::Persistent => {
            PersistentDriver::from_runtime(runtime).map(|d| Box::new(d) as Box<dyn Driver>)
        }
        DriverKind::Cookie => {
            CookieDriver::from_runtime(runtime, cookie.clone()).map(|d| Box::new(d) as Box<dyn Driver>)
        }
        DriverKind::Memory => Some(Box::new(MemoryDriver::new()) as Box<dyn Driver>),
        DriverKind::Auto => None,
    }
}

fn select_driver(runtime: &Runtime, config: &StorageConfig) -> Box<dyn Driver> {
    if !runtime.is_browser() {
        debug!(preferred = %config.driver, "Non-browser runtime, using memory driver");
        return Box::new(MemoryDriver::new());
    }

    if config.driver != DriverKind::Auto {
        if let Some(driver) = build_driver(config.driver, runtime, &config.cookie) {
            return driver;
        }
        let err = StorageError::UnsupportedDriver(config.driver);
        warn!(error = %err, "Preferred driver unavailable, selecting automatically");
    }

    DriverKind::PRIORITY
        .iter()
        .find_map(|kind| build_driver(*kind, runtime, &config.cookie))
        .unwrap_or_else(|| Box::new(MemoryDriver::new()) as Box<dyn Driver>)
}
