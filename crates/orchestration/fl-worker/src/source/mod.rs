//! Record source implementations.
//!
//! - [`KafkaSource`]: consumes the flight topic as part of a consumer group
//! - [`StdinSource`]: reads JSONL flight records from stdin (for local testing)

mod kafka;
mod stdin;

pub use kafka::{KafkaSource, KafkaSourceConfig};
pub use stdin::StdinSource;
