//! Configuration types for the producer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default topic flight records are published to.
pub const DEFAULT_TOPIC: &str = "flights";

/// Default API request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default minimum delay between two publishes.
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(10);

/// Default upper bound on the final flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// What a run does with per-message delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryPolicy {
    /// Report failures in the summary; the run still succeeds.
    #[default]
    BestEffort,
    /// Any failed delivery fails the run (after flushing everything else).
    Strict,
}

/// Configuration for one producer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Upstream flight API endpoint
    pub api_url: String,

    /// Destination topic
    pub topic: String,

    /// Absolute timeout for the API request
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,

    /// Minimum delay between two publishes (zero disables throttling)
    #[serde(with = "duration_millis")]
    pub send_interval: Duration,

    /// Upper bound on the final flush
    #[serde(with = "duration_millis")]
    pub flush_timeout: Duration,

    /// Delivery failure policy
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
}

impl ProducerConfig {
    /// Create a configuration for `api_url` with defaults.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            topic: DEFAULT_TOPIC.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            send_interval: DEFAULT_SEND_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            delivery_policy: DeliveryPolicy::default(),
        }
    }

    /// Set the destination topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the API request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the minimum delay between publishes.
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Set the flush timeout.
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Set the delivery failure policy.
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.trim().is_empty() {
            return Err("api_url must not be empty".to_string());
        }
        if self.topic.is_empty() {
            return Err("topic must not be empty".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than zero".to_string());
        }
        if self.flush_timeout.is_zero() {
            return Err("flush_timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Serde helper storing a Duration as whole milliseconds.
mod duration_millis {
    use serde::{self, Deserialize, Deserializer, Serializer};
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
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
