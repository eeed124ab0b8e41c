//! fl-indexer - prepares the `esflight` index and writes enriched flight
//! records into it.
//!
//! [`IndexSchemaManager`] sits on top of an [`IndexStore`](fl_traits::IndexStore):
//!
//! - [`ElasticsearchStore`] talks to a cluster over its REST API
//! - [`MemoryIndexStore`] keeps documents in process for tests and dry runs
//!
//! Index creation tolerates concurrent creators, and writes are keyed by
//! aircraft `hex` so redelivered records overwrite instead of duplicating.

pub mod elasticsearch;
pub mod manager;
pub mod memory;
pub mod retry;
pub mod schema;

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchStore};
pub use manager::{IndexSchemaManager, IndexStatus, WriteSummary};
pub use memory::MemoryIndexStore;
pub use retry::{with_retry, RetryConfig};
pub use schema::{flight_index_schema, load_schema, DEFAULT_INDEX};
