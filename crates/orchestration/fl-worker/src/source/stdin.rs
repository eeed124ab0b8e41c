//! Stdin record source.

use async_trait::async_trait;
use fl_error::{Result, SourceError};
use fl_traits::{RecordSource, SourceMessage};
use parking_lot::Mutex;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Record source that reads one JSON flight record per line.
///
/// Empty lines are skipped. Payloads are passed through unparsed; the worker
/// counts lines that are not flight records. Commits are no-ops apart from a
/// counter.
pub struct StdinSource {
    reader: Mutex<Box<dyn BufRead + Send>>,
    eof_reached: AtomicBool,
    line_counter: AtomicU64,
    committed: AtomicU64,
}

impl StdinSource {
    /// Create a new stdin source.
    pub fn new() -> Self {
        Self::with_reader(Box::new(BufReader::new(io::stdin())))
    }

    /// Create a source with a custom reader (for testing).
    pub fn with_reader(reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            reader: Mutex::new(reader),
            eof_reached: AtomicBool::new(false),
            line_counter: AtomicU64::new(0),
            committed: AtomicU64::new(0),
        }
    }

    /// Returns the number of committed messages.
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for StdinSource {
    async fn receive(&self, max: usize, _wait: Duration) -> Result<Option<Vec<SourceMessage>>> {
        if self.eof_reached.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let mut messages = Vec::with_capacity(max);
        let mut reader = self.reader.lock();

        while messages.len() < max {
            // Raw bytes: a line that is not UTF-8 is handed on and rejected by the parser
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    self.eof_reached.store(true, Ordering::Relaxed);
                    debug!("Stdin EOF reached");
                    break;
                }
                Ok(_) => {
                    let offset = self.line_counter.fetch_add(1, Ordering::Relaxed) as i64;
                    let line = line.trim_ascii();
                    if line.is_empty() {
                        continue;
                    }

                    trace!(offset, "Read line from stdin");
                    messages.push(SourceMessage::unpartitioned(
                        format!("stdin@{offset}"),
                        offset,
                        line.to_vec(),
                    ));
                }
                Err(e) => {
                    if messages.is_empty() {
                        return Err(SourceError::Receive(format!("Failed to read from stdin: {e}")).into());
                    }
                    // Hand over what we have; a persistent error resurfaces on the next poll
                    debug!(error = %e, "Stdin read error after partial batch");
                    break;
                }
            }
        }

        if messages.is_empty() && self.eof_reached.load(Ordering::Relaxed) {
            Ok(None)
        } else {
            Ok(Some(messages))
        }
    }

    async fn commit(&self, messages: &[SourceMessage]) -> Result<()> {
        self.committed
            .fetch_add(messages.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}
