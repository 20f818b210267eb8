//! ---
//! por_section: "01-core-functionality"
//! por_subsection: "binary"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Binary entrypoint for the PoR mock daemon."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use por_mock_common::{init_tracing, AppConfig, LogFormat};
use por_mock_server::{
    new_registry, spawn_fixture_server, spawn_metrics_server, FixtureMetrics, FixtureState,
};
use tokio::signal;
use tracing::{info, warn};

const DEFAULT_CONFIG_CANDIDATE: &str = "configs/por-mock.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Scenario-driven mock upstream for proof-of-reserve oracle testing",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "PORT", help = "Listening port, overrides config and PORT")]
    port: Option<u16>,

    #[arg(long, value_name = "FORMAT", help = "Log format: structured-json or pretty")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("configuration file {} does not exist", path.display());
        }
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from(DEFAULT_CONFIG_CANDIDATE));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    config.apply_env_overrides()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate()?;

    init_tracing("por-mockd", &config.logging)?;
    match &loaded.source {
        Some(path) => info!(config_path = %path.display(), "configuration loaded"),
        None => info!("no configuration file found; using defaults"),
    }

    run_daemon(config).await
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let registry = new_registry();
    let metrics = FixtureMetrics::new(registry.clone())?;

    let metrics_server = if config.metrics.enabled {
        let server = spawn_metrics_server(registry, config.metrics.listen)?;
        info!(address = %server.addr(), "metrics exporter enabled");
        Some(server)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let state = Arc::new(FixtureState::new(metrics));
    let fixture = spawn_fixture_server(state, config.server.listen_addr())?;
    info!(
        address = %fixture.addr(),
        reserves = %format!("http://{}/api/reserves/", fixture.addr()),
        health = %format!("http://{}/health", fixture.addr()),
        "mock reserve server ready; waiting for termination signal"
    );

    shutdown_signal().await;
    info!("termination signal received; shutting down");

    fixture.shutdown().await?;
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        tokio::select! {
            _ = ctrl_c() => {},
            _ = terminate() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(?err, "failed to install Ctrl+C handler");
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(err) => warn!(?err, "failed to install SIGTERM handler"),
    }
}
