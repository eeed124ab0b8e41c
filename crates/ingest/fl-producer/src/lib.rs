//! fl-producer - fetches live flight records and publishes them to the
//! `flights` topic keyed by aircraft `hex`.
//!
//! A run is a single fetch followed by a throttled, asynchronous publish of
//! every returned record and a blocking flush:
//!
//! ```ignore
//! use fl_producer::{IngestionProducer, KafkaPublisher, KafkaPublisherConfig, ProducerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let publisher = KafkaPublisher::new(&KafkaPublisherConfig::new("kafka:9092"))?;
//! let producer = IngestionProducer::new(ProducerConfig::new(api_url), Arc::new(publisher))?;
//!
//! let summary = producer.fetch_and_publish(&CancellationToken::new()).await?;
//! eprintln!("{} delivered, {} failed", summary.delivered, summary.failed);
//! ```

pub mod config;
pub mod fetch;
pub mod kafka;
pub mod memory;
pub mod producer;
pub mod throttle;

pub use config::{DeliveryPolicy, ProducerConfig};
pub use fetch::{parse_response_body, ApiClient};
pub use kafka::{KafkaPublisher, KafkaPublisherConfig};
pub use memory::{MemoryPublisher, PublishedMessage};
pub use producer::{IngestionProducer, PublishSummary};
pub use throttle::Throttle;
