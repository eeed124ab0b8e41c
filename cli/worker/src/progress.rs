//! Progress reporting for fl-worker.

use fl_cli_common::format_number;
use fl_worker::WorkerStats;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Periodic progress line on stderr.
pub struct ProgressReporter {
    enabled: bool,
    interval: Duration,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    pub fn new(enabled: bool, interval_secs: u64) -> Self {
        Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
            start_time: Instant::now(),
        }
    }

    /// Start the background progress reporter.
    pub fn start(&mut self, stats: Arc<WorkerStats>) {
        if !self.enabled {
            return;
        }

        let stop = Arc::clone(&self.stop);
        let interval = self.interval;
        let start_time = self.start_time;

        self.handle = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await;

            loop {
                timer.tick().await;
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                report(&stats, "", start_time);
            }
        }));
    }

    /// Stop the reporter and print a final line.
    pub async fn stop(mut self, stats: &WorkerStats) {
        if !self.enabled {
            return;
        }

        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }

        report(stats, "Complete: ", self.start_time);
    }
}

fn report(stats: &WorkerStats, prefix: &str, start_time: Instant) {
    let _ = writeln!(
        io::stderr(),
        "[Progress] {prefix}{} received, {} written, {} failed, {} malformed ({:.1}s elapsed)",
        format_number(stats.received()),
        format_number(stats.written()),
        format_number(stats.failed()),
        format_number(stats.malformed()),
        start_time.elapsed().as_secs_f64()
    );
}
