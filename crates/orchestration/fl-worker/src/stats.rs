//! Statistics for worker runs.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected during a worker run.
///
/// Updated from the run loop and readable from other tasks (e.g. a progress
/// reporter) without locking.
#[derive(Debug, Default)]
pub struct WorkerStats {
    started_at: Option<DateTime<Utc>>,
    last_batch_at: Mutex<Option<DateTime<Utc>>>,

    /// Messages received from the source
    received: AtomicU64,

    /// Messages that were not flight records
    malformed: AtomicU64,

    /// Records enriched
    enriched: AtomicU64,

    /// Documents written to the index
    written: AtomicU64,

    /// Documents that failed to write after retries
    failed: AtomicU64,

    /// Batches completed
    batches: AtomicU64,

    /// Source receive or commit errors
    source_errors: AtomicU64,
}

impl WorkerStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Record received messages.
    pub fn record_received(&self, count: u64) {
        self.received.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a malformed message.
    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed batch.
    pub fn record_batch(&self, enriched: u64, written: u64, failed: u64) {
        self.enriched.fetch_add(enriched, Ordering::Relaxed);
        self.written.fetch_add(written, Ordering::Relaxed);
        self.failed.fetch_add(failed, Ordering::Relaxed);
        self.batches.fetch_add(1, Ordering::Relaxed);
        *self.last_batch_at.lock() = Some(Utc::now());
    }

    /// Record a source error.
    pub fn record_source_error(&self) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of received messages.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Get the number of malformed messages.
    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Get the number of written documents.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Get the number of failed documents.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| Utc::now() - start)
    }

    /// Create a snapshot of the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            completed_at: None,
            last_batch_at: *self.last_batch_at.lock(),
            received: self.received(),
            malformed: self.malformed(),
            enriched: self.enriched.load(Ordering::Relaxed),
            written: self.written(),
            failed: self.failed(),
            batches: self.batches.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
        }
    }
}

/// A serializable snapshot of worker statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_batch_at: Option<DateTime<Utc>>,
    pub received: u64,
    pub malformed: u64,
    pub enriched: u64,
    pub written: u64,
    pub failed: u64,
    pub batches: u64,
    pub source_errors: u64,
}

impl StatsSnapshot {
    /// Run duration, if the run has completed.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Records written per second over the whole run.
    pub fn records_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.written as f64 / secs
            } else {
                0.0
            }
        })
    }
}
