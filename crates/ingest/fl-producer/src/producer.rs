//! One fetch-and-publish run.

use crate::config::{DeliveryPolicy, ProducerConfig};
use crate::fetch::ApiClient;
use crate::throttle::Throttle;
use fl_error::{FlError, PublishError, Result};
use fl_traits::{DeliveryFuture, MessagePublisher};
use fl_types::raw_key;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    /// Messages submitted to the publisher
    pub attempted: usize,

    /// Messages acknowledged by the broker
    pub delivered: usize,

    /// Messages that failed delivery
    pub failed: usize,

    /// True if the run stopped submitting early because it was cancelled
    pub cancelled: bool,
}

impl PublishSummary {
    /// Returns true if every attempted message was delivered.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed == 0 && self.delivered == self.attempted
    }
}

/// Fetches flight records from the upstream API and publishes them keyed by
/// `hex`.
pub struct IngestionProducer {
    api: ApiClient,
    publisher: Arc<dyn MessagePublisher>,
    config: ProducerConfig,
}

impl IngestionProducer {
    /// Create a producer with its own API client.
    pub fn new(config: ProducerConfig, publisher: Arc<dyn MessagePublisher>) -> Result<Self> {
        config.validate().map_err(FlError::Config)?;
        let api = ApiClient::new(&config.api_url, config.request_timeout)?;
        Ok(Self {
            api,
            publisher,
            config,
        })
    }

    /// Create a producer with a pre-built API client.
    pub fn with_api_client(
        api: ApiClient,
        config: ProducerConfig,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        Self {
            api,
            publisher,
            config,
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Runs one fetch followed by a throttled publish of every record.
    ///
    /// Fetch errors abort the run before anything is published. Once
    /// publishing starts, every submitted message is flushed and its delivery
    /// resolved before returning, including when `cancel` fires mid-run.
    ///
    /// # Errors
    ///
    /// - any [`IngestError`](fl_error::IngestError) from the fetch
    /// - [`FlError::Cancelled`] if cancelled before the fetch completed
    /// - [`PublishError::Serialize`] if a record cannot be encoded
    /// - [`PublishError::Delivery`] under [`DeliveryPolicy::Strict`] when any
    ///   delivery failed
    pub async fn fetch_and_publish(&self, cancel: &CancellationToken) -> Result<PublishSummary> {
        let items = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FlError::Cancelled),
            fetched = self.api.fetch() => fetched?,
        };

        info!(count = items.len(), topic = %self.config.topic, "Fetched flight records");

        let mut summary = PublishSummary::default();
        let mut deliveries: Vec<DeliveryFuture> = Vec::with_capacity(items.len());
        let mut throttle = Throttle::new(self.config.send_interval);

        for item in &items {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(
                        submitted = deliveries.len(),
                        remaining = items.len() - deliveries.len(),
                        "Run cancelled, stopping submission"
                    );
                    summary.cancelled = true;
                    break;
                }
                _ = throttle.acquire() => {}
            }

            let payload = match serde_json::to_vec(item) {
                Ok(payload) => payload,
                Err(e) => {
                    // Deliveries already submitted still need to resolve.
                    self.flush().await;
                    return Err(PublishError::Serialize(e.to_string()).into());
                }
            };
            let key = raw_key(item);

            deliveries.push(self.publisher.publish(&self.config.topic, &key, payload));

            if deliveries.len() == 1 {
                info!(key = %key, "First message sent");
            }
        }

        summary.attempted = deliveries.len();
        self.flush().await;

        for (index, result) in join_all(deliveries).await.into_iter().enumerate() {
            match result {
                Ok(receipt) => {
                    summary.delivered += 1;
                    debug!(
                        index,
                        partition = receipt.partition,
                        offset = receipt.offset,
                        "Message delivered"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(index, error = %e, "Message delivery failed");
                }
            }
        }

        info!(
            attempted = summary.attempted,
            delivered = summary.delivered,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Publish run finished"
        );

        if self.config.delivery_policy == DeliveryPolicy::Strict && summary.failed > 0 {
            return Err(PublishError::Delivery(format!(
                "{} of {} messages failed delivery",
                summary.failed, summary.attempted
            ))
            .into());
        }

        Ok(summary)
    }

    async fn flush(&self) {
        if let Err(e) = self.publisher.flush(self.config.flush_timeout).await {
            warn!(error = %e, "Flush did not complete; pending deliveries resolve as failures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPublisher;
    use fl_error::IngestError;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_api(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn producer_with(server: &MockServer, publisher: Arc<dyn MessagePublisher>) -> IngestionProducer {
        let config = ProducerConfig::new(format!("{}/flights", server.uri()))
            .with_send_interval(Duration::ZERO)
            .with_request_timeout(Duration::from_millis(500));
        IngestionProducer::new(config, publisher).unwrap()
    }

    fn producer(
        server: &MockServer,
        publisher: Arc<MemoryPublisher>,
        policy: DeliveryPolicy,
    ) -> IngestionProducer {
        let config = ProducerConfig::new(format!("{}/flights", server.uri()))
            .with_send_interval(Duration::ZERO)
            .with_request_timeout(Duration::from_millis(500))
            .with_delivery_policy(policy);
        IngestionProducer::new(config, publisher).unwrap()
    }

    #[tokio::test]
    async fn test_publishes_every_item_in_order() {
        let server = mock_api(json!({
            "response": [
                {"hex": "abc123", "dep_iata": "CDG", "arr_iata": "ORY"},
                {"dep_iata": "CDG"},
                {"hex": "def456", "speed": 420}
            ]
        }))
        .await;
        let publisher = Arc::new(MemoryPublisher::new());

        let summary = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.delivered, 3);
        assert!(summary.is_complete());

        let messages = publisher.messages();
        let keys: Vec<&str> = messages.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["abc123", "", "def456"]);
        assert!(messages.iter().all(|m| m.topic == "flights"));

        // Forwarded verbatim, no derived fields yet
        let first = messages[0].json().unwrap();
        assert_eq!(first, json!({"hex": "abc123", "dep_iata": "CDG", "arr_iata": "ORY"}));
        assert_eq!(publisher.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_payload_keeps_upstream_key_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"response":[{"hex":"abc123","dep_iata":"CDG","arr_iata":"ORY","alt":1.5}]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;
        let publisher = Arc::new(MemoryPublisher::new());

        producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            publisher.messages()[0].payload,
            br#"{"hex":"abc123","dep_iata":"CDG","arr_iata":"ORY","alt":1.5}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn test_missing_response_publishes_nothing() {
        let server = mock_api(json!({"error": "quota"})).await;
        let publisher = Arc::new(MemoryPublisher::new());

        let summary = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary, PublishSummary::default());
        assert!(publisher.is_empty());
    }

    #[tokio::test]
    async fn test_status_error_publishes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let publisher = Arc::new(MemoryPublisher::new());

        let result = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(FlError::Ingest(IngestError::ApiStatus { code: 500 }))
        ));
        assert!(publisher.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_publishes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": [{"hex": "abc123"}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let publisher = Arc::new(MemoryPublisher::new());

        let result = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(FlError::Ingest(IngestError::ApiTimeout(_)))
        ));
        assert!(publisher.is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_reports_failures() {
        let server = mock_api(json!({
            "response": [{"hex": "a"}, {"hex": "b"}, {"hex": "c"}]
        }))
        .await;
        let publisher = Arc::new(MemoryPublisher::with_failures([1]));

        let summary = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete());
    }

    #[tokio::test]
    async fn test_strict_fails_run_after_flush() {
        let server = mock_api(json!({
            "response": [{"hex": "a"}, {"hex": "b"}]
        }))
        .await;
        let publisher = Arc::new(MemoryPublisher::with_failures([0]));

        let result = producer(&server, publisher.clone(), DeliveryPolicy::Strict)
            .fetch_and_publish(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(FlError::Publish(PublishError::Delivery(_)))
        ));
        assert_eq!(publisher.len(), 2);
        assert_eq!(publisher.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let server = mock_api(json!({"response": [{"hex": "a"}]})).await;
        let publisher = Arc::new(MemoryPublisher::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = producer(&server, publisher.clone(), DeliveryPolicy::BestEffort)
            .fetch_and_publish(&cancel)
            .await;

        assert!(matches!(result, Err(FlError::Cancelled)));
        assert!(publisher.is_empty());
    }

    /// Cancels `cancel` once `after` messages have been submitted.
    struct CancellingPublisher {
        inner: MemoryPublisher,
        cancel: CancellationToken,
        after: usize,
    }

    #[async_trait::async_trait]
    impl MessagePublisher for CancellingPublisher {
        fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> DeliveryFuture {
            let delivery = self.inner.publish(topic, key, payload);
            if self.inner.len() == self.after {
                self.cancel.cancel();
            }
            delivery
        }

        async fn flush(&self, timeout: Duration) -> Result<()> {
            self.inner.flush(timeout).await
        }
    }

    #[tokio::test]
    async fn test_cancelled_mid_publish_flushes_submitted() {
        let server = mock_api(json!({
            "response": [{"hex": "a"}, {"hex": "b"}, {"hex": "c"}, {"hex": "d"}]
        }))
        .await;
        let cancel = CancellationToken::new();
        let publisher = Arc::new(CancellingPublisher {
            inner: MemoryPublisher::new(),
            cancel: cancel.clone(),
            after: 2,
        });

        let summary = producer_with(&server, publisher.clone())
            .fetch_and_publish(&cancel)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 2);
        assert!(summary.cancelled);
        assert!(!summary.is_complete());
        assert_eq!(publisher.inner.len(), 2);
        assert_eq!(publisher.inner.flush_count(), 1);
    }
}
