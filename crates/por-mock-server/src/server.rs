//! ---
//! por_section: "03-http-surface"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Fixture routes, handlers, and server lifecycle."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use por_mock_scenarios::{iso_now, resolve_delay, select, ScenarioQuery};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::fault::FixtureFault;
use crate::metrics::FixtureMetrics;
use crate::transport;

/// Shared state injected into the handlers. Read-only after construction.
pub struct FixtureState {
    started: Instant,
    metrics: FixtureMetrics,
}

impl FixtureState {
    pub fn new(metrics: FixtureMetrics) -> Self {
        Self {
            started: Instant::now(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &FixtureMetrics {
        &self.metrics
    }
}

impl fmt::Debug for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureState")
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// Build the fixture router: reserves, health, and the JSON 404 fallback.
pub fn router(state: Arc<FixtureState>) -> Router {
    Router::new()
        .route("/api/reserves", get(get_reserves))
        .route("/api/reserves/", get(get_reserves))
        .route("/health", get(get_health))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Handle to the running fixture server.
#[derive(Debug)]
pub struct FixtureServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl FixtureServer {
    /// Address actually bound, useful when the configured port was 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Bind `addr` and serve the fixture on a background task.
pub fn spawn_fixture_server(state: Arc<FixtureState>, addr: SocketAddr) -> Result<FixtureServer> {
    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind fixture listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure fixture listener as non-blocking")?;
    let local_addr = listener.local_addr()?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let app = router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %local_addr, "fixture server listening");
        if let Err(err) = axum::serve(tcp_listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %local_addr, error = %err, "fixture server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(FixtureServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

async fn get_reserves(
    State(state): State<Arc<FixtureState>>,
    query: Result<Query<ScenarioQuery>, QueryRejection>,
) -> Response {
    match serve_reserves(&state, query).await {
        Ok(response) => response,
        Err(fault) => {
            state.metrics.record_request("fault");
            fault.into_response()
        }
    }
}

async fn serve_reserves(
    state: &FixtureState,
    query: Result<Query<ScenarioQuery>, QueryRejection>,
) -> Result<Response, FixtureFault> {
    let Query(query) = query.map_err(|rejection| FixtureFault::Query(rejection.body_text()))?;

    if let Some(delay) = resolve_delay(&query)? {
        info!(delay_ms = delay.as_millis() as u64, source = "query", "delaying response");
        state.metrics.observe_delay(delay);
        sleep(delay).await;
    }

    let selector = select(&query)?;
    let plan = selector.plan()?;
    state.metrics.record_request(selector.label());
    transport::execute(plan, &state.metrics).await
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    /// Seconds since the server state was created.
    uptime: f64,
}

async fn get_health(State(state): State<Arc<FixtureState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: iso_now(),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

#[derive(Debug, Serialize)]
struct NotFoundResponse {
    error: &'static str,
    path: String,
    message: String,
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    let path = uri.path().to_owned();
    let message = format!("Cannot {method} {path}");
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Not Found",
            path,
            message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(FixtureState::new(FixtureMetrics::detached().unwrap())))
    }

    async fn call(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn trailing_slash_is_optional() {
        let (with_slash, _) = call("/api/reserves/").await;
        let (without, _) = call("/api/reserves").await;
        assert_eq!(with_slash, StatusCode::OK);
        assert_eq!(without, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_uptime() {
        let (status, body) = call("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let (status, body) = call("/api/unknown?x=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/api/unknown");
        assert_eq!(body["message"], "Cannot GET /api/unknown");
    }

    #[tokio::test]
    async fn malformed_delay_is_fault() {
        let (status, body) = call("/api/reserves/?delay=later").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert!(body["message"].as_str().unwrap().contains("delay"));
    }

    #[tokio::test]
    async fn duplicated_parameter_is_fault() {
        let (status, body) = call("/api/reserves/?size=1&size=2").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().contains("query"));
    }
}
