//! CLI argument definitions for fl-producer.

use clap::{Parser, ValueEnum};
use fl_producer::DeliveryPolicy;
pub use fl_cli_common::LogLevel;

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

/// Publishes live flight records to a Kafka topic.
///
/// Performs one fetch from the flight API and publishes every returned record
/// keyed by its aircraft `hex`. Exits 0 on success and 1 on failure.
///
/// ## Examples
///
/// Publish to the default broker:
///   fl-producer --api-url "https://airlabs.co/api/v9/flights?api_key=..."
///
/// Print the messages instead of publishing:
///   fl-producer --api-url http://localhost:8000/flights --dry-run
#[derive(Parser, Debug)]
#[command(name = "fl-producer")]
#[command(version = version_string(), about, long_about = None)]
pub struct Cli {
    // === Upstream API ===
    /// Flight API endpoint
    #[arg(long, env = "API_URL")]
    pub api_url: String,

    /// API request timeout in milliseconds
    #[arg(long, default_value = "10000", value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_ms: u64,

    // === Kafka ===
    /// Kafka bootstrap servers
    #[arg(short = 'b', long, env = "FL_KAFKA_BOOTSTRAP_SERVERS", default_value = "kafka:9092")]
    pub bootstrap_servers: String,

    /// Destination topic
    #[arg(short = 't', long, env = "FL_TOPIC", default_value = "flights")]
    pub topic: String,

    /// Minimum delay between two sends in milliseconds (0 disables throttling)
    #[arg(long, default_value = "10")]
    pub send_interval_ms: u64,

    /// Upper bound on the final flush in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub flush_timeout: u64,

    /// What a failed delivery does to the run
    #[arg(long, value_enum, default_value = "best-effort")]
    pub delivery_policy: DeliveryPolicyArg,

    /// Print messages to stdout as JSON lines instead of publishing
    #[arg(long)]
    pub dry_run: bool,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Delivery policy argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeliveryPolicyArg {
    /// Report failed deliveries; the run still succeeds
    BestEffort,
    /// Any failed delivery fails the run
    Strict,
}

impl From<DeliveryPolicyArg> for DeliveryPolicy {
    fn from(arg: DeliveryPolicyArg) -> Self {
        match arg {
            DeliveryPolicyArg::BestEffort => DeliveryPolicy::BestEffort,
            DeliveryPolicyArg::Strict => DeliveryPolicy::Strict,
        }
    }
}
