//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "binary"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Scenario matrix subcommand."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use anyhow::{bail, Result};
use clap::Args;
use por_mock_probe::{run_matrix, MatrixRow};
use reqwest::Client;
use tokio::runtime::Runtime;

use crate::LimitArgs;

/// Options for the scenario matrix.
#[derive(Debug, Args)]
pub struct MatrixArgs {
    /// Base URL of the mock server.
    #[arg(long, value_name = "URL", default_value = "http://localhost:3000")]
    pub url: String,
    #[command(flatten)]
    pub limits: LimitArgs,
}

pub fn run(args: MatrixArgs) -> Result<()> {
    let limits = args.limits.limits();
    let runtime = Runtime::new()?;
    let rows = runtime.block_on(async {
        let client = Client::builder().build()?;
        anyhow::Ok(run_matrix(&client, &args.url, &limits).await?)
    })?;

    render(&rows);
    let mismatches = rows.iter().filter(|row| !row.matches()).count();
    if mismatches > 0 {
        bail!("{mismatches} of {} scenarios did not meet their expected verdict", rows.len());
    }
    println!("all {} scenarios met their expected verdict", rows.len());
    Ok(())
}

fn render(rows: &[MatrixRow]) {
    println!("{:<26} {:<8} {:<6} OUTCOME", "SCENARIO", "EXPECTED", "OK");
    for row in rows {
        println!(
            "{:<26} {:<8} {:<6} {}",
            row.scenario.name(),
            row.expected.to_string(),
            if row.matches() { "yes" } else { "NO" },
            row.outcome
        );
    }
}
