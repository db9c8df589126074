//! Background Expiry Sweeper
//!
//! Expiry in this crate is lazy: an expired entry is removed when an
//! operation observes it. An entry that is never read again stays in the
//! medium, which matters for media that outlive the process (a persistent
//! store grows, a cookie jar keeps paying header bytes until the native
//! max-age fires).
//!
//! The sweeper is an opt-in Tokio task that periodically calls
//! [`Storage::purge_expired`] to bound that growth. It is never started
//! implicitly.
//!
//! ## Adaptive Frequency
//!
//! If a large share of the scanned keys had expired, the sweeper runs more
//! often. If nothing expired, it backs off to save work.

use crate::storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    /// Base interval between sweeps (default: 30s)
    pub base_interval: Duration,

    /// Minimum interval between sweeps (default: 1s)
    pub min_interval: Duration,

    /// Maximum interval between sweeps (default: 5min)
    pub max_interval: Duration,

    /// If this fraction of scanned keys are expired, speed up sweeping
    pub speedup_threshold: f64,

    /// If this fraction of scanned keys are expired, slow down sweeping
    pub slowdown_threshold: f64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(30),
            min_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(300),
            speedup_threshold: 0.25,
            slowdown_threshold: 0.01,
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper on the current Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stashkv::storage::{ExpiryConfig, ExpirySweeper, Storage};
    /// use stashkv::Runtime;
    /// use std::sync::Arc;
    ///
    /// let storage = Arc::new(Storage::new(&Runtime::server()));
    /// let sweeper = ExpirySweeper::start(storage, ExpiryConfig::default());
    ///
    /// // Dropping the sweeper will stop it
    /// drop(sweeper);
    /// ```
    pub fn start(storage: Arc<Storage>, config: ExpiryConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(storage, config, shutdown_rx));

        info!("Background expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the expiry sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        debug!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Next interval given how many of `scanned` keys expired in the last sweep.
fn next_interval(current: Duration, expired: u64, scanned: usize, config: &ExpiryConfig) -> Duration {
    if scanned == 0 {
        return current;
    }

    let expiry_rate = expired as f64 / scanned as f64;

    if expiry_rate > config.speedup_threshold {
        (current / 2).max(config.min_interval)
    } else if expiry_rate < config.slowdown_threshold && expired == 0 {
        (current * 2).min(config.max_interval)
    } else {
        current
    }
}

async fn sweeper_loop(
    storage: Arc<Storage>,
    config: ExpiryConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut current_interval = config.base_interval;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(current_interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    trace!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let stats = storage.sweep();
        let (expired, scanned) = (stats.expired, stats.scanned);

        let next = next_interval(current_interval, expired, scanned, &config);
        if next != current_interval {
            trace!(
                expired,
                scanned,
                new_interval_ms = next.as_millis() as u64,
                "Sweeper interval adjusted"
            );
            current_interval = next;
        }

        if expired > 0 {
            debug!(
                expired,
                keys_remaining = storage.physical_len(),
                "Expired entries cleaned up"
            );
        }
    }
}

/// Starts the expiry sweeper with default configuration.
pub fn start_expiry_sweeper(storage: Arc<Storage>) -> ExpirySweeper {
    ExpirySweeper::start(storage, ExpiryConfig::default())
}
