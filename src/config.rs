//! Storage Configuration
//!
//! Configuration is layered: defaults, then an optional JSON file, then
//! environment variables.
//!
//! | Variable                 | Field                          |
//! |--------------------------|--------------------------------|
//! | `STASHKV_DRIVER`         | `driver`                       |
//! | `STASHKV_COOKIE_PATH`    | `cookie.path`                  |
//! | `STASHKV_COOKIE_MAX_AGE` | `cookie.default_max_age_secs`  |
//!
//! A config file looks like:
//!
//! ```json
//! { "driver": "cookies", "cookie": { "path": "/app" } }
//! ```

use crate::driver::DriverKind;
use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cookie max-age applied when no TTL is given (~10 years).
pub const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 315_400_000;

pub const ENV_DRIVER: &str = "STASHKV_DRIVER";
pub const ENV_COOKIE_PATH: &str = "STASHKV_COOKIE_PATH";
pub const ENV_COOKIE_MAX_AGE: &str = "STASHKV_COOKIE_MAX_AGE";

/// How the cookie driver writes its cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// `Path` attribute of every cookie written
    pub path: String,

    /// `Max-Age` for entries stored without a TTL
    pub default_max_age_secs: u64,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            default_max_age_secs: DEFAULT_COOKIE_MAX_AGE_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Preferred driver; `auto` picks the best supported one
    pub driver: DriverKind,

    pub cookie: CookieOptions,
}

impl StorageConfig {
    pub fn from_json_str(text: &str) -> StorageResult<Self> {
        serde_json::from_str(text).map_err(|err| StorageError::Config(err.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> StorageResult<Self> {
        Self::default().apply_env()
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(self) -> StorageResult<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overrides fields from any variable source.
    pub fn apply_vars<F>(mut self, lookup: F) -> StorageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(driver) = lookup(ENV_DRIVER) {
            self.driver = driver.parse()?;
        }

        if let Some(path) = lookup(ENV_COOKIE_PATH) {
            self.cookie.path = path;
        }

        if let Some(max_age) = lookup(ENV_COOKIE_MAX_AGE) {
            self.cookie.default_max_age_secs = max_age.trim().parse().map_err(|_| {
                StorageError::Config(format!("{} must be a number of seconds", ENV_COOKIE_MAX_AGE))
            })?;
        }

        Ok(self)
    }
}
