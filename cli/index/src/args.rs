//! CLI argument definitions for fl-index.

use clap::Parser;
use fl_indexer::DEFAULT_INDEX;
pub use fl_cli_common::LogLevel;
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

/// Creates the flight index if it does not exist.
///
/// An existing index is left untouched, and it is safe to run concurrently.
///
/// ## Examples
///
/// Create `esflight` with the built-in mapping:
///   fl-index
///
/// Use a mapping file:
///   fl-index --index flights-v2 --schema mapping.json
#[derive(Parser, Debug)]
#[command(name = "fl-index")]
#[command(version = version_string(), about, long_about = None)]
pub struct Cli {
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
    #[arg(short = 'i', long, env = "FL_INDEX", default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Mapping document (JSON); the built-in flight mapping when omitted
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
