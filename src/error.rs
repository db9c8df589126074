//! Error Types
//!
//! The public storage contract never surfaces these errors: `get`, `set`,
//! `has`, `remove`, `keys` and `empty` report failure through booleans and
//! `Option`. The errors below flow between the media and the drivers, and
//! out of the strict constructors (`Storage::try_with_config`,
//! `Storage::open_file`, `FileStore::open`, configuration loading).

use crate::driver::DriverKind;
use thiserror::Error;

/// Errors reported by a physical medium (name/value store or cookie jar).
#[derive(Debug, Error)]
pub enum MediumError {
    /// The write would exceed the medium's byte quota.
    #[error("quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The medium exists but refuses writes (e.g. private browsing).
    #[error("security error: {0}")]
    SecurityError(String),

    /// A single cookie is larger than the jar accepts.
    #[error("cookie too large: {size} bytes (max: {max})")]
    CookieTooLarge { size: usize, max: usize },

    /// The jar already holds its maximum number of cookies.
    #[error("too many cookies (max: {0})")]
    TooManyCookies(usize),

    /// Cookies are switched off for this runtime.
    #[error("cookies are disabled")]
    CookiesDisabled,

    /// The cookie line could not be parsed.
    #[error("malformed cookie: {0}")]
    MalformedCookie(String),

    /// The backing file holds something other than a JSON string map.
    #[error("corrupt store file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested driver cannot run in this runtime.
    #[error("driver '{0}' is not supported in this runtime")]
    UnsupportedDriver(DriverKind),

    /// A driver name that matches none of the known drivers.
    #[error("unknown driver name: {0}")]
    UnknownDriver(String),

    /// The key collides with the reserved TTL shadow suffix.
    #[error("invalid key '{0}': reserved suffix")]
    InvalidKey(String),

    /// A value could not be structurally encoded or decoded.
    #[error("serialization fallback: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Medium(#[from] MediumError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations that can fail strictly.
pub type StorageResult<T> = Result<T, StorageError>;
