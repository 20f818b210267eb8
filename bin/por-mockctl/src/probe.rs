//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "binary"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Single-request probe subcommand."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use anyhow::Result;
use clap::Args;
use por_mock_probe::{probe, ProbeRequest};
use reqwest::Client;
use tokio::runtime::Runtime;

use crate::LimitArgs;

/// Options for a single probe.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Base URL of the mock server.
    #[arg(long, value_name = "URL", default_value = "http://localhost:3000")]
    pub url: String,
    /// Named scenario to request.
    #[arg(long)]
    pub scenario: Option<String>,
    /// Delay to request, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub delay: Option<u64>,
    /// Status code to induce.
    #[arg(long, value_name = "STATUS")]
    pub error: Option<u16>,
    /// Padded body size to request, in KiB.
    #[arg(long, value_name = "KIB")]
    pub size: Option<u64>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

impl ProbeArgs {
    pub fn request(&self) -> ProbeRequest {
        ProbeRequest {
            scenario: self.scenario.clone(),
            delay: self.delay,
            error: self.error,
            size: self.size,
        }
    }
}

pub fn run(args: ProbeArgs) -> Result<()> {
    let url = args.request().url(&args.url)?;
    let limits = args.limits.limits();
    let runtime = Runtime::new()?;
    let outcome = runtime.block_on(async {
        let client = Client::builder().build()?;
        anyhow::Ok(probe(&client, url.clone(), &limits).await)
    })?;
    println!("{url}\n{outcome}");
    Ok(())
}
