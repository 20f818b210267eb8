//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "binary"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Operator CLI for probing a running PoR mock."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use por_mock_common::init_cli;
use por_mock_probe::ConsumerLimits;

mod matrix;
mod probe;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Probe a PoR mock the way the oracle consumer would",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Fetch reserves once and print the consumer's verdict")]
    Probe(probe::ProbeArgs),
    #[command(about = "Probe every scenario and compare against expected verdicts")]
    Matrix(matrix::MatrixArgs),
}

/// Consumer limits shared by both subcommands.
#[derive(Debug, Args)]
pub struct LimitArgs {
    /// Largest accepted body in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = 100 * 1024)]
    pub max_body_bytes: usize,
    /// Request deadline in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
}

impl LimitArgs {
    pub fn limits(&self) -> ConsumerLimits {
        ConsumerLimits {
            max_body_bytes: self.max_body_bytes,
            request_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn main() -> Result<()> {
    init_cli();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => probe::run(args)?,
        Commands::Matrix(args) => matrix::run(args)?,
    }
    Ok(())
}
