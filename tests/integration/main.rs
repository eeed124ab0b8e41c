//! Integration tests for flightline.
//!
//! `pipeline_test` runs the whole ingest, enrich and index path against a
//! mock flight API and in-memory broker and store. The Kafka and
//! Elasticsearch tests need live services and are marked `#[ignore]`.
//!
//! ## Running Integration Tests
//!
//! 1. Start Kafka and Elasticsearch, e.g.:
//!    ```bash
//!    docker compose up -d kafka elasticsearch
//!    ```
//!
//! 2. Run the ignored tests:
//!    ```bash
//!    FL_KAFKA_BOOTSTRAP_SERVERS=localhost:9092 FL_ES_URL=http://localhost:9200 \
//!      cargo test -p integration-tests -- --ignored
//!    ```

mod elasticsearch_test;
mod kafka_test;
mod pipeline_test;
