//! Cache Statistics Module
//!
//! Tracks store metrics including hits, misses and expired entries purged.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of store metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing (absent, expired or wrong kind)
    pub misses: u64,
    /// Number of entries purged by expiry sweeps
    pub expirations: u64,
    /// Number of sweeps that actually ran
    pub sweeps: u64,
    /// Number of keys currently tracked
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// Lock-free counters shared by concurrent store callers.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    sweeps: AtomicU64,
}

impl StatsCounters {
    /// Records a read outcome.
    pub fn record_read(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_sweep(&self, purged: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.expirations.fetch_add(purged as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            total_entries,
        }
    }
}
