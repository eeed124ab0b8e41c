//! In-memory publisher for tests and dry runs.

use async_trait::async_trait;
use fl_error::{PublishError, Result};
use fl_traits::{DeliveryFuture, DeliveryReceipt, MessagePublisher};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A message captured by [`MemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the message was sent to
    pub topic: String,

    /// Message key
    pub key: String,

    /// Message payload
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    /// Parses the payload as JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.payload)
    }
}

/// Publisher that records every message in submission order.
///
/// Deliveries resolve immediately. Chosen message indices (0-based, in
/// submission order) can be made to fail delivery.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failing: HashSet<usize>,
    flushes: AtomicU64,
}

impl MemoryPublisher {
    /// Create a publisher where every delivery succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher where the messages at `indices` fail delivery.
    pub fn with_failures(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns all messages submitted so far.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().clone()
    }

    /// Returns the number of messages submitted so far.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns true if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Returns how many times `flush` was called.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessagePublisher for MemoryPublisher {
    fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> DeliveryFuture {
        let index = {
            let mut messages = self.messages.lock();
            messages.push(PublishedMessage {
                topic: topic.to_string(),
                key: key.to_string(),
                payload,
            });
            messages.len() - 1
        };

        let result = if self.failing.contains(&index) {
            Err(PublishError::Delivery(format!(
                "injected delivery failure for message {index}"
            )))
        } else {
            Ok(DeliveryReceipt {
                partition: 0,
                offset: index as i64,
            })
        };

        futures::future::ready(result).boxed()
    }

    async fn flush(&self, _timeout: Duration) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let publisher = MemoryPublisher::new();

        let first = publisher.publish("flights", "a", b"{}".to_vec()).await.unwrap();
        let second = publisher.publish("flights", "b", b"{}".to_vec()).await.unwrap();

        assert_eq!(first.offset, 0);
        assert_eq!(second.offset, 1);

        let keys: Vec<String> = publisher.messages().into_iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let publisher = MemoryPublisher::with_failures([1]);

        assert!(publisher.publish("t", "a", vec![]).await.is_ok());
        assert!(matches!(
            publisher.publish("t", "b", vec![]).await,
            Err(PublishError::Delivery(_))
        ));
        assert_eq!(publisher.len(), 2);
    }

    #[tokio::test]
    async fn test_flush_count() {
        let publisher = MemoryPublisher::new();
        publisher.flush(Duration::from_secs(1)).await.unwrap();
        assert_eq!(publisher.flush_count(), 1);
    }
}
