//! fl-worker CLI
//!
//! Consumes raw flight records, enriches them against the airport reference
//! tables and writes them to the flight index.

use clap::Parser;
use fl_cli_common::{format_duration, format_number};

mod args;
mod progress;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    fl_cli_common::init_logging(args.log_level)?;

    let stats = run::execute(args).await?;

    eprintln!();
    eprintln!("Worker completed:");
    eprintln!("  Received:  {}", format_number(stats.received));
    eprintln!("  Malformed: {}", format_number(stats.malformed));
    eprintln!("  Written:   {}", format_number(stats.written));
    eprintln!("  Failed:    {}", format_number(stats.failed));
    eprintln!("  Batches:   {}", format_number(stats.batches));

    if let Some(duration) = stats.duration().and_then(|d| d.to_std().ok()) {
        eprintln!("  Duration:  {}", format_duration(duration));
    }
    if let Some(rate) = stats.records_per_second() {
        eprintln!("  Throughput: {} records/sec", format_number(rate as u64));
    }

    // Partial failure
    if stats.failed > 0 {
        std::process::exit(4);
    }

    Ok(())
}
