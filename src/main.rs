//! checkall - exhaustive feature-matrix verification for Cargo projects
//!
//! Verifies that every combination of enabled / disabled features
//! compiles, produces no warnings, builds all targets and passes tests.

use checkall::commands::Commands;
use checkall::{cli, common};
use clap::Parser;

#[derive(Parser)]
#[command(name = "checkall", about = "Verify every feature combination of a Cargo project")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init();

    let cli = Cli::parse();

    match cli::dispatch(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
