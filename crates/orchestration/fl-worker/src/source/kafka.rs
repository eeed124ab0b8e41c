//! Kafka record source.

use async_trait::async_trait;
use fl_error::{Result, SourceError};
use fl_traits::{RecordSource, SourceMessage};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

/// Default consumer group.
pub const DEFAULT_GROUP_ID: &str = "flight-enrichment";

/// Connection settings for [`KafkaSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaSourceConfig {
    /// Comma-separated broker list
    pub bootstrap_servers: String,

    /// Topic to consume
    pub topic: String,

    /// Consumer group id
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Where a new group starts reading (`earliest` or `latest`)
    #[serde(default = "default_offset_reset")]
    pub auto_offset_reset: String,

    /// Extra librdkafka properties
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_offset_reset() -> String {
    "earliest".to_string()
}

impl KafkaSourceConfig {
    /// Create a configuration consuming `topic` from the given brokers.
    pub fn new(bootstrap_servers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            topic: topic.into(),
            group_id: default_group_id(),
            auto_offset_reset: default_offset_reset(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the consumer group.
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Set the offset reset policy.
    pub fn with_auto_offset_reset(mut self, reset: impl Into<String>) -> Self {
        self.auto_offset_reset = reset.into();
        self
    }

    /// Set an extra client property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Builds the rdkafka client configuration.
    ///
    /// Auto-commit is always off: offsets are committed explicitly once a
    /// batch is indexed.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (key, value) in &self.properties {
            config.set(key, value);
        }
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("enable.auto.commit", "false");
        config
    }
}

/// [`RecordSource`] consuming the flight topic.
pub struct KafkaSource {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaSource {
    /// Create a consumer and subscribe to the configured topic.
    pub fn new(config: &KafkaSourceConfig) -> Result<Self> {
        let consumer: StreamConsumer = config
            .client_config()
            .create()
            .map_err(|e| SourceError::Connection(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| SourceError::Connection(format!("Failed to subscribe: {e}")))?;

        info!(
            bootstrap_servers = %config.bootstrap_servers,
            topic = %config.topic,
            group_id = %config.group_id,
            "Subscribed to topic"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl RecordSource for KafkaSource {
    async fn receive(&self, max: usize, wait: Duration) -> Result<Option<Vec<SourceMessage>>> {
        let deadline = Instant::now() + wait;
        let mut messages = Vec::with_capacity(max);

        while messages.len() < max {
            let message = match timeout_at(deadline, self.consumer.recv()).await {
                Ok(Ok(message)) => message,
                Ok(Err(e)) => {
                    if messages.is_empty() {
                        return Err(SourceError::Receive(e.to_string()).into());
                    }
                    // Hand over what we have; the error resurfaces on the next poll
                    debug!(error = %e, "Receive error after partial batch");
                    break;
                }
                Err(_) => break,
            };

            let partition = message.partition();
            let offset = message.offset();
            messages.push(SourceMessage {
                id: format!("{}/{}@{}", self.topic, partition, offset),
                key: message
                    .key()
                    .map(|key| String::from_utf8_lossy(key).into_owned()),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                partition,
                offset,
            });
        }

        Ok(Some(messages))
    }

    async fn commit(&self, messages: &[SourceMessage]) -> Result<()> {
        // Highest offset per partition; committing it covers everything below
        let mut next_offsets: BTreeMap<i32, i64> = BTreeMap::new();
        for message in messages {
            let next = next_offsets.entry(message.partition).or_insert(message.offset + 1);
            *next = (*next).max(message.offset + 1);
        }

        if next_offsets.is_empty() {
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for (partition, offset) in &next_offsets {
            tpl.add_partition_offset(&self.topic, *partition, Offset::Offset(*offset))
                .map_err(|e| SourceError::Commit(e.to_string()))?;
        }

        self.consumer
            .commit(&tpl, CommitMode::Async)
            .map_err(|e| SourceError::Commit(e.to_string()))?;

        debug!(partitions = next_offsets.len(), "Committed offsets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_disables_auto_commit() {
        let config = KafkaSourceConfig::new("localhost:9092", "flights")
            .with_group_id("test-group")
            .with_property("enable.auto.commit", "true");

        let client = config.client_config();

        assert_eq!(client.get("group.id"), Some("test-group"));
        assert_eq!(client.get("auto.offset.reset"), Some("earliest"));
        assert_eq!(client.get("enable.auto.commit"), Some("false"));
    }
}
