//! Cache Statistics Module
//!
//! Tracks read outcomes and janitor activity with lock-free counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Recorder ==
/// Shared counters updated by callers and the janitor.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_reads: AtomicU64,
    swept: AtomicU64,
    stale_markers: AtomicU64,
    orphaned_markers: AtomicU64,
    sweeps: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a read that found an entry past its deadline.
    pub fn record_expired_read(&self) {
        self.expired_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Folds one sweep's outcome into the totals.
    pub fn record_sweep(&self, removed: u64, stale: u64, orphaned: u64) {
        self.swept.fetch_add(removed, Ordering::Relaxed);
        self.stale_markers.fetch_add(stale, Ordering::Relaxed);
        self.orphaned_markers.fetch_add(orphaned, Ordering::Relaxed);
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter into a plain snapshot.
    ///
    /// Counters are read one by one, so a snapshot taken under load is not a
    /// single consistent cut.
    pub fn snapshot(&self, total_entries: usize, pending_expirations: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_reads: self.expired_reads.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            stale_markers: self.stale_markers.load(Ordering::Relaxed),
            orphaned_markers: self.orphaned_markers.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            total_entries,
            pending_expirations,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (absent, unknown or expired key)
    pub misses: u64,
    /// Misses caused by an entry that was still stored but past its deadline
    pub expired_reads: u64,
    /// Entries removed by the janitor
    pub swept: u64,
    /// Markers skipped because their key had been overwritten
    pub stale_markers: u64,
    /// Markers skipped because their key was already gone
    pub orphaned_markers: u64,
    /// Completed janitor runs
    pub sweeps: u64,
    /// Entries physically present in the store
    pub total_entries: usize,
    /// Markers waiting in the expiration queue
    pub pending_expirations: usize,
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

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsRecorder::new().snapshot(0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_miss();
        recorder.record_expired_read();

        let stats = recorder.snapshot(3, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expired_reads, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.pending_expirations, 1);
    }

    #[test]
    fn test_record_sweep_accumulates() {
        let recorder = StatsRecorder::new();
        recorder.record_sweep(2, 1, 0);
        recorder.record_sweep(0, 0, 3);

        let stats = recorder.snapshot(0, 0);
        assert_eq!(stats.swept, 2);
        assert_eq!(stats.stale_markers, 1);
        assert_eq!(stats.orphaned_markers, 3);
        assert_eq!(stats.sweeps, 2);
    }

    #[test]
    fn test_stats_serialize() {
        let recorder = StatsRecorder::new();
        recorder.record_hit();

        let json = serde_json::to_value(recorder.snapshot(1, 0)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["total_entries"], 1);
        assert_eq!(json["pending_expirations"], 0);
    }
}
