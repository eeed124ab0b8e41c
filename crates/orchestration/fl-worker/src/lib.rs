//! fl-worker - the stage between the `flights` topic and the index.
//!
//! A [`Worker`] pulls raw flight records from a
//! [`RecordSource`](fl_traits::RecordSource), enriches each batch against the
//! current reference snapshot and writes the result through an
//! [`IndexSchemaManager`](fl_indexer::IndexSchemaManager). Messages are
//! committed only after their batch has been written, so a crash replays
//! them; writes are keyed by `hex`, so a replay overwrites instead of
//! duplicating.
//!
//! # Example
//!
//! ```ignore
//! use fl_worker::{KafkaSource, KafkaSourceConfig, Worker, WorkerConfig};
//!
//! let source = KafkaSource::new(&KafkaSourceConfig::new("kafka:9092", "flights"))?;
//! let worker = Worker::new(WorkerConfig::new(), source, snapshot_handle, manager);
//!
//! let stats = worker.run(&CancellationToken::new()).await?;
//! eprintln!("Wrote {} of {} records", stats.written, stats.received);
//! ```

pub mod config;
pub mod refresh;
pub mod source;
pub mod stats;
pub mod worker;

pub use config::WorkerConfig;
pub use refresh::spawn_snapshot_refresh;
pub use source::{KafkaSource, KafkaSourceConfig, StdinSource};
pub use stats::{StatsSnapshot, WorkerStats};
pub use worker::Worker;
