//! Configuration types for the worker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of messages per batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default time to wait for a batch to fill.
pub const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(1);

/// Configuration for a worker instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Maximum messages enriched and written together
    pub batch_size: usize,

    /// How long one receive waits for messages
    #[serde(with = "duration_millis")]
    pub poll_wait: Duration,

    /// Delay before polling again after a receive error
    #[serde(with = "duration_millis")]
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            poll_wait: DEFAULT_POLL_WAIT,
            error_backoff: Duration::from_millis(100),
        }
    }
}

impl WorkerConfig {
    /// Create a new worker configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the receive wait.
    pub fn with_poll_wait(mut self, wait: Duration) -> Self {
        self.poll_wait = wait;
        self
    }

    /// Set the backoff after receive errors.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.poll_wait.is_zero() {
            return Err("poll_wait must be greater than zero".to_string());
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
