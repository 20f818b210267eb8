//! ---
//! por_section: "03-http-surface"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Prometheus instrumentation and the optional scrape listener."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{response::IntoResponse, Router};
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared registry type.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Counters and histograms recorded by the fixture handlers.
#[derive(Clone)]
pub struct FixtureMetrics {
    registry: SharedRegistry,
    requests: IntCounterVec,
    aborts: IntCounter,
    injected_delay: Histogram,
}

impl FixtureMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new(
                "por_mock_requests_total",
                "Reserve requests answered, by selected outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let aborts = IntCounter::with_opts(Opts::new(
            "por_mock_connection_aborts_total",
            "Connections deliberately torn down mid-response",
        ))?;
        registry.register(Box::new(aborts.clone()))?;

        let buckets = prometheus::exponential_buckets(0.01, 2.0, 12)
            .context("failed to construct histogram buckets")?;
        let injected_delay = Histogram::with_opts(
            HistogramOpts::new(
                "por_mock_injected_delay_seconds",
                "Artificial delay applied before responding",
            )
            .buckets(buckets),
        )?;
        registry.register(Box::new(injected_delay.clone()))?;

        Ok(Self {
            registry,
            requests,
            aborts,
            injected_delay,
        })
    }

    /// Metrics backed by a private registry that nothing scrapes.
    pub fn detached() -> Result<Self> {
        Self::new(new_registry())
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn record_request(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    pub fn record_abort(&self) {
        self.aborts.inc();
    }

    pub fn observe_delay(&self, delay: Duration) {
        self.injected_delay.observe(delay.as_secs_f64());
    }

    pub fn requests_for(&self, outcome: &str) -> u64 {
        self.requests.with_label_values(&[outcome]).get()
    }

    pub fn aborts(&self) -> u64 {
        self.aborts.get()
    }
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
pub fn spawn_metrics_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get({
            let registry = registry.clone();
            move || metrics_handler(registry.clone())
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {addr}"))?;
    std_listener
        .set_nonblocking(true)
        .context("failed to configure metrics listener as non-blocking")?;
    let local_addr = std_listener.local_addr()?;
    let listener = TcpListener::from_std(std_listener)
        .context("failed to convert std listener into tokio listener")?;

    info!(address = %local_addr, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

async fn metrics_handler(registry: SharedRegistry) -> impl IntoResponse {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(prometheus::TEXT_FORMAT),
            )],
            body,
        ),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                )],
                String::from("metrics encoding error"),
            )
        }
    }
}

/// Handle to the running scrape listener.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}
