//! Storage Drivers
//!
//! A driver adapts one physical medium to a common raw contract:
//! get/set/remove/has/list over string keys and string values. Drivers know
//! nothing about expiry semantics; they only store what they are given,
//! including the TTL shadow entries the expiration layer writes.
//!
//! ## Variants
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┬───────────────────────────┐
//! │ Driver           │ Medium                   │ Shadow entries            │
//! ├──────────────────┼──────────────────────────┼───────────────────────────┤
//! │ PersistentDriver │ NameValueStore           │ sibling key `<key>.___exp`│
//! │ CookieDriver     │ CookieJar                │ sibling cookie + Max-Age  │
//! │ MemoryDriver     │ process-local map        │ sibling map               │
//! └──────────────────┴──────────────────────────┴───────────────────────────┘
//! ```
//!
//! ## Shadow Layout
//!
//! The expiry of `key` is stored under `key.___exp` as decimal milliseconds
//! since the Unix epoch. Every driver lists shadow keys in `raw_keys`;
//! filtering them is the expiration layer's job.

pub mod cookie;
pub mod memory;
pub mod persistent;

pub use cookie::CookieDriver;
pub use memory::MemoryDriver;
pub use persistent::PersistentDriver;

use crate::error::StorageError;
use crate::runtime::Runtime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix that marks a TTL shadow key.
pub const TTL_SUFFIX: &str = ".___exp";

/// Returns the shadow key holding the expiry of `key`.
pub fn shadow_key(key: &str) -> String {
    format!("{}{}", key, TTL_SUFFIX)
}

pub fn is_shadow_key(key: &str) -> bool {
    key.ends_with(TTL_SUFFIX)
}

/// Returns the key a shadow key belongs to, or `None` for ordinary keys.
pub fn companion_key(shadow: &str) -> Option<&str> {
    shadow.strip_suffix(TTL_SUFFIX)
}

/// Parses a stored expiry timestamp.
///
/// Accepts integral and fractional milliseconds, since other writers may
/// have stored `Date.now() + ttl * 1000` with a fractional TTL.
pub fn parse_expiry(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| ms as u64)
    })
}

/// Identifies a driver variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Durable name/value store
    #[serde(alias = "localStorage", alias = "local_storage")]
    Persistent,

    /// Cookie header
    #[serde(alias = "cookies")]
    Cookie,

    /// Process-local map
    #[serde(alias = "js")]
    Memory,

    /// Best supported driver in priority order
    #[default]
    #[serde(alias = "default")]
    Auto,
}

impl DriverKind {
    /// Priority order used by automatic selection.
    pub const PRIORITY: [DriverKind; 3] =
        [DriverKind::Persistent, DriverKind::Cookie, DriverKind::Memory];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Persistent => "persistent",
            DriverKind::Cookie => "cookie",
            DriverKind::Memory => "memory",
            DriverKind::Auto => "auto",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persistent" | "localstorage" | "local_storage" => Ok(DriverKind::Persistent),
            "cookie" | "cookies" => Ok(DriverKind::Cookie),
            "memory" | "js" => Ok(DriverKind::Memory),
            "auto" | "default" | "" => Ok(DriverKind::Auto),
            _ => Err(StorageError::UnknownDriver(s.to_string())),
        }
    }
}

/// The raw contract every driver implements.
///
/// All operations are synchronous. Failures are reported as `false` or
/// `None`; the driver logs the underlying medium error.
pub trait Driver: Send + Sync {
    fn kind(&self) -> DriverKind;

    /// Whether this driver can operate in `runtime`. May write and delete a
    /// probe entry.
    fn is_supported(runtime: &Runtime) -> bool
    where
        Self: Sized;

    fn raw_get(&self, key: &str) -> Option<String>;

    fn raw_set(&self, key: &str, value: &str) -> bool;

    /// Writes a value that should disappear at `expires_at` (milliseconds
    /// since epoch). Media without native expiry ignore the deadline.
    fn raw_set_expiring(&self, key: &str, value: &str, _expires_at: u64) -> bool {
        self.raw_set(key, value)
    }

    /// Removes a key. Returns true if it existed.
    fn raw_remove(&self, key: &str) -> bool;

    fn raw_has(&self, key: &str) -> bool {
        self.raw_get(key).is_some()
    }

    /// Every physical key, shadow keys included.
    fn raw_keys(&self) -> Vec<String>;

    /// Number of physical keys, shadow keys included.
    fn raw_len(&self) -> usize {
        self.raw_keys().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_keys() {
        assert_eq!(shadow_key("session"), "session.___exp");
        assert!(is_shadow_key("session.___exp"));
        assert!(!is_shadow_key("session"));
        assert_eq!(companion_key("session.___exp"), Some("session"));
        assert_eq!(companion_key("session"), None);
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(parse_expiry(" 1700000000000.5 "), Some(1_700_000_000_000));
        assert_eq!(parse_expiry("-5"), None);
        assert_eq!(parse_expiry("soon"), None);
    }

    #[test]
    fn test_driver_kind_names() {
        assert_eq!("localStorage".parse::<DriverKind>().unwrap(), DriverKind::Persistent);
        assert_eq!("cookies".parse::<DriverKind>().unwrap(), DriverKind::Cookie);
        assert_eq!("js".parse::<DriverKind>().unwrap(), DriverKind::Memory);
        assert_eq!("default".parse::<DriverKind>().unwrap(), DriverKind::Auto);
        assert!(matches!(
            "floppy".parse::<DriverKind>(),
            Err(StorageError::UnknownDriver(_))
        ));
        assert_eq!(DriverKind::Cookie.to_string(), "cookie");
    }
}
