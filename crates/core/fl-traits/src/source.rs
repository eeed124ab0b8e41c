//! Record source trait for the consumer side of the flight topic.

use async_trait::async_trait;
use fl_error::Result;
use std::time::Duration;

/// A raw message received from a record source.
#[derive(Debug, Clone)]
pub struct SourceMessage {
    /// Unique message id for logging (e.g. `flights/2@1045`)
    pub id: String,

    /// Message key, if any
    pub key: Option<String>,

    /// Message payload (JSON flight record)
    pub payload: Vec<u8>,

    /// Partition the message was read from (0 for non-partitioned sources)
    pub partition: i32,

    /// Offset within the partition
    pub offset: i64,
}

impl SourceMessage {
    /// Creates a message with no broker position, e.g. a line read from stdin.
    pub fn unpartitioned(id: impl Into<String>, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            key: None,
            payload,
            partition: 0,
            offset,
        }
    }
}

/// Trait for sources of raw flight records.
///
/// # Delivery Semantics
///
/// Sources are at-least-once: a message is only considered consumed after
/// [`commit`](RecordSource::commit) has been called for it. Messages received
/// but not committed may be redelivered after a restart.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Receives up to `max` messages, waiting at most `wait` for the first one.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(vec))` - Messages received (may be empty if none arrived in time)
    /// - `Ok(None)` - Source is exhausted (EOF reached)
    async fn receive(&self, max: usize, wait: Duration) -> Result<Option<Vec<SourceMessage>>>;

    /// Marks messages as consumed.
    async fn commit(&self, messages: &[SourceMessage]) -> Result<()>;
}
