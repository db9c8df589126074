//! # StashKV - Unified Client-Side Key/Value Storage
//!
//! StashKV presents one key/value contract over three very different
//! backing media, picking the best one the runtime offers:
//!
//! - a durable name/value store (the `localStorage` shape)
//! - the cookie header (size-limited, sent over the wire)
//! - a process-local map (always available)
//!
//! Every entry may carry a time-to-live, layered on top of media that have
//! no per-entry expiry of their own.
//!
//! ## Features
//!
//! - **Driver Selection**: Probes the runtime and falls back in priority order
//! - **Lossless Values**: Strings, numbers, booleans, null, arrays, objects and
//!   Unicode text survive string-only media
//! - **TTL Support**: Per-entry expiry with lazy purge on access
//! - **Optional Sweeper**: A background Tokio task can purge unread entries
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              StashKV                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────────────────┐  │
//! │  │  Runtime    │───>│  Storage    │───>│       ExpiringStore         │  │
//! │  │ (probes)    │    │  (facade)   │    │ (codec + TTL shadow index)  │  │
//! │  └─────────────┘    └─────────────┘    └──────────────┬──────────────┘  │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │                     ┌──────────────────────────────────────────────┐    │
//! │                     │                 dyn Driver                   │    │
//! │                     │  ┌────────────┐ ┌────────────┐ ┌───────────┐ │    │
//! │                     │  │ Persistent │ │  Cookie    │ │  Memory   │ │    │
//! │                     │  └─────┬──────┘ └─────┬──────┘ └───────────┘ │    │
//! │                     └────────┼──────────────┼──────────────────────┘    │
//! │                              ▼              ▼                           │
//! │                     NameValueStore      CookieJar                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use stashkv::medium::{InMemoryCookieJar, InMemoryStore};
//! use stashkv::{DriverKind, Runtime, Storage, Value};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let runtime = Runtime::browser()
//!     .with_local_storage(Arc::new(InMemoryStore::new()))
//!     .with_cookie_jar(Arc::new(InMemoryCookieJar::new()));
//!
//! let storage = Storage::with_driver(&runtime, DriverKind::Cookie);
//!
//! storage.set("greeting", "Ключ и значение");
//! storage.set_with_ttl("session", vec![1, 2, 3], Duration::from_secs(60));
//!
//! assert_eq!(storage.get("greeting"), Some(Value::from("Ключ и значение")));
//! assert!(storage.has("session"));
//! assert!(storage.empty());
//! ```
//!
//! ## Module Overview
//!
//! - [`codec`]: Value type and string serialization with fallbacks
//! - [`medium`]: Media interfaces and reference implementations
//! - [`driver`]: The three drivers over the media
//! - [`storage`]: Expiration layer, facade and optional sweeper
//! - [`config`]: Driver preference and cookie options
//!
//! ## Design Highlights
//!
//! ### Lazy Expiry
//!
//! There is no timer by default. An expired entry behaves as absent on every
//! read path and is physically removed by the first operation that sees it.
//!
//! ### Shared Media
//!
//! Expiry deadlines are stored next to their entries in the medium, so two
//! facades over the same medium agree on what has expired. Read-then-write
//! sequences across facades are not atomic.

pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod medium;
pub mod runtime;
pub mod storage;

// Re-export commonly used types for convenience
pub use codec::Value;
pub use config::{CookieOptions, StorageConfig};
pub use driver::{Driver, DriverKind};
pub use error::{MediumError, StorageError, StorageResult};
pub use runtime::{Context, Runtime};
pub use storage::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper, Storage};

use std::time::{SystemTime, UNIX_EPOCH};

/// Suffix of TTL shadow keys
pub use driver::TTL_SUFFIX;

/// Cookie max-age used when no TTL is given (~10 years)
pub use config::DEFAULT_COOKIE_MAX_AGE_SECS;

/// Version of StashKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
