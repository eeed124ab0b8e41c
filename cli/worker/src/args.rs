//! CLI argument definitions for fl-worker.

use clap::{Parser, ValueEnum};
use fl_cli_common::parse_positive_usize;
pub use fl_cli_common::LogLevel;
use fl_indexer::DEFAULT_INDEX;
use std::path::PathBuf;

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get the version string with build metadata.
fn version_string() -> &'static str {
    let version = env!("CARGO_PKG_VERSION");
    let commit = built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown");
    let date = built_info::BUILT_TIME_UTC;
    let s = format!("{version} ({commit} {date})");
    Box::leak(s.into_boxed_str())
}

/// Enriches flight records and writes them to the flight index.
///
/// Reads raw records from Kafka (or JSON lines on stdin), classifies each
/// flight as domestic, international or unknown, attaches airport positions
/// and names, and writes the result keyed by aircraft `hex`.
///
/// ## Examples
///
/// Consume the flights topic:
///   fl-worker --airports airports.csv
///
/// Enrich a captured file locally:
///   cat flights.jsonl | fl-worker -i stdin --airports airports.csv
#[derive(Parser, Debug)]
#[command(name = "fl-worker")]
#[command(version = version_string(), about, long_about = None)]
pub struct Cli {
    // === Input Source ===
    /// Input source type
    #[arg(short = 'i', long, value_enum, default_value = "kafka")]
    pub input: InputType,

    /// Kafka bootstrap servers
    #[arg(short = 'b', long, env = "FL_KAFKA_BOOTSTRAP_SERVERS", default_value = "kafka:9092")]
    pub bootstrap_servers: String,

    /// Topic to consume
    #[arg(short = 't', long, env = "FL_TOPIC", default_value = "flights")]
    pub topic: String,

    /// Consumer group
    #[arg(long, env = "FL_GROUP_ID", default_value = "flight-enrichment")]
    pub group_id: String,

    // === Reference Data ===
    /// Airport CSV (path or http(s) URL) feeding all reference tables
    #[arg(long, env = "FL_AIRPORTS")]
    pub airports: String,

    /// Separate source for the country table
    #[arg(long)]
    pub country_source: Option<String>,

    /// Separate source for the position table
    #[arg(long)]
    pub position_source: Option<String>,

    /// Separate source for the name table
    #[arg(long)]
    pub name_source: Option<String>,

    /// Reload the reference tables every N seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub reference_refresh: Option<u64>,

    // === Destination ===
    /// Elasticsearch URL
    #[arg(long, env = "FL_ES_URL", default_value = "http://localhost:9200")]
    pub es_url: String,

    /// Elasticsearch user (basic auth)
    #[arg(long, env = "FL_ES_USER")]
    pub es_user: Option<String>,

    /// Elasticsearch password (basic auth)
    #[arg(long, env = "FL_ES_PASSWORD", hide_env_values = true)]
    pub es_password: Option<String>,

    /// Index name
    #[arg(long, env = "FL_INDEX", default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Mapping document (JSON) used if the index has to be created
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Maximum write retries per document
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    // === Processing ===
    /// Records per batch (must be >= 1)
    #[arg(long, default_value = "500", value_parser = parse_positive_usize)]
    pub batch_size: usize,

    /// How long one poll waits for records, in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_wait_ms: u64,

    // === Progress Options ===
    /// Enable progress reporting to stderr
    #[arg(long)]
    pub progress: bool,

    /// Progress reporting interval in seconds
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub progress_interval: u64,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Input source type.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InputType {
    /// Read JSON flight records from stdin, one per line
    Stdin,
    /// Consume the flights topic
    Kafka,
}
