//! Message publisher trait and delivery types.

use async_trait::async_trait;
use fl_error::{PublishError, Result};
use futures::future::BoxFuture;
use std::time::Duration;

/// Broker acknowledgement for one delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Partition the message landed in
    pub partition: i32,

    /// Offset assigned by the broker
    pub offset: i64,
}

/// Future resolving once the broker has acknowledged or rejected a message.
pub type DeliveryFuture = BoxFuture<'static, std::result::Result<DeliveryReceipt, PublishError>>;

/// Trait for keyed message producers.
///
/// Publishing is split in two steps so a caller can submit many messages
/// without waiting on the broker:
///
/// 1. [`publish`](MessagePublisher::publish) enqueues the message and returns
///    immediately with a [`DeliveryFuture`]
/// 2. [`flush`](MessagePublisher::flush) blocks until every enqueued message
///    has been delivered or has permanently failed
///
/// # Implementations
///
/// - Kafka publisher: rdkafka `FutureProducer`
/// - Memory publisher: records messages in order for tests and dry runs
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Enqueues a message for `topic` with the given key and payload.
    ///
    /// Local enqueue failures (full queue, unknown topic) are reported through
    /// the returned future rather than as an immediate error.
    fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> DeliveryFuture;

    /// Waits until all outstanding messages are resolved or `timeout` elapses.
    async fn flush(&self, timeout: Duration) -> Result<()>;
}
