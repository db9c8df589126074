//! Expiration Layer
//!
//! Wraps any [`Driver`] and adds per-entry time-to-live on top of it.
//!
//! ## TTL Index
//!
//! The expiry of `key` is a shadow entry `key.___exp` stored through the
//! same driver, holding the deadline in milliseconds since the epoch. Keeping
//! the index in the medium means two facades sharing a medium agree on
//! deadlines, and a persistent medium keeps them across restarts.
//!
//! ## Lazy Expiry
//!
//! There is no timer. An entry whose deadline has passed stays in the
//! medium until an operation observes it:
//!
//! - `get` / `has` purge it and report it absent
//! - `keys` purges every expired entry it meets (and orphaned shadows)
//! - `remove` purges it and reports that nothing was removed
//!
//! `purge_expired` runs the same sweep on demand; the optional
//! [`ExpirySweeper`](super::ExpirySweeper) calls it periodically.
//!
//! Every sequence that reads a deadline and then rewrites the entry or its
//! shadow runs under one mutex, so a sweep on another thread can never
//! purge a value written after it checked the old deadline.

use crate::codec::{self, Value};
use crate::driver::{companion_key, parse_expiry, shadow_key, Driver, DriverKind};
use crate::now_millis;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Outcome of a full pass over the physical keys.
#[derive(Debug, Default)]
struct Scan {
    live: Vec<String>,
    stats: SweepStats,
}

/// Counts from one sweep over the medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Entries examined, shadow keys excluded
    pub scanned: usize,
    /// Expired entries removed
    pub expired: u64,
    /// Shadow keys removed because their entry was gone
    pub orphans: u64,
}

pub struct ExpiringStore {
    driver: Box<dyn Driver>,
    /// Held across every sequence that touches an entry and its shadow.
    write_lock: Mutex<()>,
}

impl ExpiringStore {
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            driver,
            write_lock: Mutex::new(()),
        }
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.driver.kind()
    }

    /// Deadline of `key` in milliseconds since epoch, if it has one.
    pub fn expires_at(&self, key: &str) -> Option<u64> {
        self.driver
            .raw_get(&shadow_key(key))
            .and_then(|raw| parse_expiry(&raw))
    }

    fn is_expired(&self, key: &str, now: u64) -> bool {
        self.expires_at(key).is_some_and(|at| at <= now)
    }

    /// Removes `key` and its shadow from the medium.
    fn purge(&self, key: &str) {
        self.driver.raw_remove(key);
        self.driver.raw_remove(&shadow_key(key));
    }

    /// Returns the decoded value, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let _guard = self.write_lock.lock();
        let raw = self.driver.raw_get(key)?;

        if self.is_expired(key, now_millis()) {
            trace!(key, "Expired on read");
            self.purge(key);
            return None;
        }

        let decoded = codec::decode(&raw);
        if decoded.is_fallback() {
            trace!(key, "Stored value is not structured, returning raw string");
        }
        Some(decoded.into_value())
    }

    pub fn has(&self, key: &str) -> bool {
        let _guard = self.write_lock.lock();
        if !self.driver.raw_has(key) {
            return false;
        }

        if self.is_expired(key, now_millis()) {
            trace!(key, "Expired on lookup");
            self.purge(key);
            return false;
        }

        true
    }

    /// Stores `value` under `key`, replacing any previous value and TTL.
    pub fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> bool {
        let encoded = codec::encode(value);
        if encoded.is_fallback() {
            debug!(key, "Value has no structured form, stored as plain string");
        }

        let _guard = self.write_lock.lock();

        let Some(ttl) = ttl else {
            if !self.driver.raw_set(key, encoded.as_str()) {
                return false;
            }
            // An overwrite without TTL must not inherit the old deadline
            self.driver.raw_remove(&shadow_key(key));
            return true;
        };

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = now_millis().saturating_add(ttl_ms);

        if !self
            .driver
            .raw_set_expiring(key, encoded.as_str(), expires_at)
        {
            return false;
        }

        if !self
            .driver
            .raw_set_expiring(&shadow_key(key), &expires_at.to_string(), expires_at)
        {
            // Without its shadow the entry would never expire
            warn!(key, "Failed to store expiry, dropping entry");
            self.purge(key);
            return false;
        }

        true
    }

    /// Removes `key`. Returns true if a live entry was removed.
    pub fn remove(&self, key: &str) -> bool {
        let _guard = self.write_lock.lock();
        let existed = self.driver.raw_has(key);
        let expired = existed && self.is_expired(key, now_millis());

        self.purge(key);
        existed && !expired
    }

    /// Removes every live entry one by one. Returns true if any existed.
    pub fn remove_all(&self) -> bool {
        self.keys()
            .into_iter()
            .fold(false, |any, key| self.remove(&key) || any)
    }

    /// Live keys, without shadow keys and without expired keys.
    pub fn keys(&self) -> Vec<String> {
        self.scan(now_millis()).live
    }

    /// Purges every expired entry and orphaned shadow. Returns the number
    /// of entries removed.
    pub fn purge_expired(&self) -> u64 {
        self.sweep().expired
    }

    /// Same as [`ExpiringStore::purge_expired`], with the full counts.
    pub fn sweep(&self) -> SweepStats {
        let stats = self.scan(now_millis()).stats;
        if stats.expired > 0 || stats.orphans > 0 {
            debug!(
                scanned = stats.scanned,
                expired = stats.expired,
                orphans = stats.orphans,
                "Purged expired entries"
            );
        }
        stats
    }

    /// Number of physical keys, shadow keys and expired entries included.
    pub fn physical_len(&self) -> usize {
        self.driver.raw_len()
    }

    fn scan(&self, now: u64) -> Scan {
        let _guard = self.write_lock.lock();
        let physical = self.driver.raw_keys();
        let present: HashSet<&str> = physical.iter().map(String::as_str).collect();
        let mut scan = Scan::default();

        for key in &physical {
            if let Some(companion) = companion_key(key) {
                if !present.contains(companion) {
                    self.driver.raw_remove(key);
                    scan.stats.orphans += 1;
                }
                continue;
            }

            scan.stats.scanned += 1;
            if self.is_expired(key, now) {
                self.purge(key);
                scan.stats.expired += 1;
                continue;
            }

            scan.live.push(key.clone());
        }

        scan
    }
}
