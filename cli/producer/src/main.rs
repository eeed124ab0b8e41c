//! fl-producer CLI
//!
//! Fetches the current flight list once and publishes every record to the
//! `flights` topic. Exit status 0 means the run succeeded, 1 that it failed.

use clap::Parser;
use std::process::ExitCode;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = fl_cli_common::init_logging(args.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run::execute(args).await {
        Ok(summary) => {
            eprintln!();
            eprintln!("Producer completed:");
            eprintln!("  Attempted: {}", summary.attempted);
            eprintln!("  Delivered: {}", summary.delivered);
            eprintln!("  Failed:    {}", summary.failed);

            if summary.cancelled {
                eprintln!("  Run was interrupted before all records were sent");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Producer failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
