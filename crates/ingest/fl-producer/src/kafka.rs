//! Kafka publisher backed by rdkafka.

use async_trait::async_trait;
use fl_error::{PublishError, Result};
use fl_traits::{DeliveryFuture, DeliveryReceipt, MessagePublisher};
use futures::FutureExt;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Default broker list.
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "kafka:9092";

/// Connection settings for the Kafka publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaPublisherConfig {
    /// Comma-separated broker list
    pub bootstrap_servers: String,

    /// How long the client keeps retrying a message before reporting failure
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,

    /// Extra librdkafka properties (e.g. `acks`, `compression.type`)
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

impl KafkaPublisherConfig {
    /// Create a configuration for the given brokers.
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            message_timeout_ms: default_message_timeout_ms(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the per-message delivery timeout.
    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set an extra client property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Builds the rdkafka client configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("message.timeout.ms", self.message_timeout_ms.to_string());
        for (key, value) in &self.properties {
            config.set(key, value);
        }
        config
    }
}

impl Default for KafkaPublisherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BOOTSTRAP_SERVERS)
    }
}

/// [`MessagePublisher`] writing to Kafka.
///
/// `publish` only enqueues into librdkafka's buffer; delivery reports are
/// produced by librdkafka's background thread and surface through the
/// returned [`DeliveryFuture`].
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    /// Create a publisher connected to the configured brokers.
    pub fn new(config: &KafkaPublisherConfig) -> Result<Self> {
        let producer: FutureProducer = config
            .client_config()
            .create()
            .map_err(|e| PublishError::Client(format!("Failed to create producer: {e}")))?;

        info!(
            bootstrap_servers = %config.bootstrap_servers,
            "Created Kafka producer"
        );

        Ok(Self { producer })
    }
}

#[async_trait]
impl MessagePublisher for KafkaPublisher {
    fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> DeliveryFuture {
        let record = FutureRecord::to(topic).key(key).payload(&payload);

        match self.producer.send_result(record) {
            Ok(delivery) => async move {
                match delivery.await {
                    Ok(Ok((partition, offset))) => Ok(DeliveryReceipt { partition, offset }),
                    Ok(Err((err, _message))) => Err(PublishError::Delivery(err.to_string())),
                    Err(_) => Err(PublishError::Delivery(
                        "producer dropped before delivery report".to_string(),
                    )),
                }
            }
            .boxed(),
            Err((err, _record)) => {
                let error = PublishError::Client(format!("Failed to enqueue message: {err}"));
                futures::future::ready(Err(error)).boxed()
            }
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<()> {
        let producer = self.producer.clone();

        debug!(timeout_ms = timeout.as_millis() as u64, "Flushing Kafka producer");

        tokio::task::spawn_blocking(move || producer.flush(timeout))
            .await
            .map_err(|e| PublishError::Flush(format!("Flush task failed: {e}")))?
            .map_err(|e| PublishError::Flush(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kafka_config_defaults() {
        let config = KafkaPublisherConfig::default();

        assert_eq!(config.bootstrap_servers, "kafka:9092");
        assert_eq!(config.message_timeout_ms, 30_000);
        assert!(config.properties.is_empty());
    }

    #[test]
    fn test_client_config_properties() {
        let config = KafkaPublisherConfig::new("localhost:9092")
            .with_message_timeout(Duration::from_secs(5))
            .with_property("acks", "all");

        let client = config.client_config();

        assert_eq!(client.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(client.get("message.timeout.ms"), Some("5000"));
        assert_eq!(client.get("acks"), Some("all"));
    }
}
