//! Core traits for flightline.
//!
//! This crate defines the seams between the pipeline and its external systems:
//! - [`MessagePublisher`] - Keyed message topic producer (Kafka, in-memory)
//! - [`RecordSource`] - Consumer side of the topic (Kafka, stdin)
//! - [`IndexStore`] - Searchable document store (Elasticsearch, in-memory)

pub mod publisher;
pub mod source;
pub mod store;

pub use publisher::*;
pub use source::*;
pub use store::*;
