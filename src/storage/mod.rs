//! Storage Module
//!
//! This module provides the unified storage contract on top of the drivers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Storage                              │
//! │       (driver selection, key validation, typed reads)       │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼─────────────────────────────────┐
//! │                     ExpiringStore                           │
//! │     (codec, TTL shadow entries, lazy purge on access)       │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//!        ┌────────────────────┼────────────────────┐
//!        ▼                    ▼                    ▼
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Persistent   │    │   Cookie     │    │   Memory     │
//! │   Driver     │    │   Driver     │    │   Driver     │
//! └──────────────┘    └──────────────┘    └──────────────┘
//!                             ▲
//!                             │ (optional)
//!              ┌──────────────┴────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use stashkv::storage::Storage;
//! use stashkv::{Runtime, Value};
//! use std::time::Duration;
//!
//! let storage = Storage::new(&Runtime::server());
//!
//! storage.set("name", "Ariz");
//! assert_eq!(storage.get("name"), Some(Value::from("Ariz")));
//!
//! storage.set_with_ttl("session", "token123", Duration::from_secs(3600));
//! assert_eq!(storage.keys().len(), 2);
//!
//! assert!(storage.empty());
//! assert!(!storage.empty());
//! ```

pub mod expiration;
pub mod expiry;
pub mod facade;

pub use expiration::{ExpiringStore, SweepStats};
pub use expiry::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper};
pub use facade::Storage;
