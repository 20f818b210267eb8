//! ---
//! por_section: "03-http-surface"
//! por_subsection: "integration-tests"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "End-to-end behaviour of the fixture over real sockets."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use por_mock_scenarios::PADDING_FIELD_OVERHEAD;
use por_mock_server::{spawn_fixture_server, FixtureMetrics, FixtureServer, FixtureState};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

struct Harness {
    server: FixtureServer,
    metrics: FixtureMetrics,
    client: Client,
}

impl Harness {
    fn start() -> Self {
        let metrics = FixtureMetrics::detached().unwrap();
        let state = Arc::new(FixtureState::new(metrics.clone()));
        let server = spawn_fixture_server(state, "127.0.0.1:0".parse().unwrap()).unwrap();
        Self {
            server,
            metrics,
            client: Client::new(),
        }
    }

    fn url(&self, query: &str) -> String {
        format!("http://{}/api/reserves/{query}", self.server.addr())
    }

    async fn get(&self, query: &str) -> reqwest::Response {
        self.client.get(self.url(query)).send().await.unwrap()
    }

    async fn stop(self) {
        drop(self.client);
        self.server.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn default_request_returns_fully_backed_report() {
    let harness = Harness::start();
    let response = harness.get("").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "FULLY_BACKED");
    assert_eq!(body["assets"].as_array().unwrap().len(), 3);
    assert_eq!(harness.metrics.requests_for("default"), 1);
    harness.stop().await;
}

#[tokio::test]
async fn sized_responses_reach_target() {
    let harness = Harness::start();
    for kib in [1u64, 5, 120] {
        let body = harness
            .get(&format!("?size={kib}"))
            .await
            .bytes()
            .await
            .unwrap();
        assert!(body.len() >= kib as usize * 1024, "size={kib}");
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert!(value["padding"].is_string());
    }
    harness.stop().await;
}

#[tokio::test]
async fn limit_scenarios_straddle_100_kib() {
    let harness = Harness::start();
    let under = harness.get("?scenario=under_limit").await.bytes().await.unwrap();
    let at = harness.get("?scenario=at_limit").await.bytes().await.unwrap();
    assert!(under.len() < 100 * 1024);
    assert!(at.len() >= 100 * 1024);
    // Not exactly 100 KiB: the padding member's own key and quotes ride on top.
    assert_eq!(at.len() - 100 * 1024, PADDING_FIELD_OVERHEAD);
    harness.stop().await;
}

#[tokio::test]
async fn induced_status_uses_canned_body() {
    let harness = Harness::start();
    let response = harness.get("?error=404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"error":"Not Found","message":"Resource not found"}"#
    );

    let response = harness.get("?error=418&scenario=at_limit").await;
    assert_eq!(response.status().as_u16(), 418);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Error");
    assert_eq!(body["message"], "An error occurred");
    harness.stop().await;
}

#[tokio::test]
async fn malformed_payload_scenarios_still_return_200() {
    let harness = Harness::start();

    let response = harness.get("?scenario=invalid_json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.bytes().await.unwrap();
    assert!(serde_json::from_slice::<Value>(&body).is_err());

    let response = harness.get("?scenario=empty_response").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = harness.get("?scenario=partial_json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let declared = response.content_length().unwrap();
    let body = response.bytes().await.unwrap();
    assert_eq!(body.len() as u64, declared);
    assert!(serde_json::from_slice::<Value>(&body).is_err());

    let response = harness.get("?scenario=wrong_content_type").await;
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body: Value = serde_json::from_slice(&response.bytes().await.unwrap()).unwrap();
    assert_eq!(body["status"], "FULLY_BACKED");

    let body: Value = harness
        .get("?scenario=negative_values")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ERROR");

    harness.stop().await;
}

#[tokio::test]
async fn connection_abort_is_a_transport_error() {
    let harness = Harness::start();
    let result = harness
        .client
        .get(harness.url("?scenario=connection_abort"))
        .send()
        .await;
    let outcome = match result {
        Ok(response) => response.bytes().await.map(|_| ()),
        Err(err) => Err(err),
    };
    assert!(outcome.is_err(), "abort scenario produced a complete body");
    assert_eq!(harness.metrics.aborts(), 1);
    harness.stop().await;
}

#[tokio::test]
async fn connection_abort_omits_chunk_terminator() {
    let harness = Harness::start();
    let mut stream = TcpStream::connect(harness.server.addr()).await.unwrap();
    stream
        .write_all(
            b"GET /api/reserves/?scenario=connection_abort HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();

    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }
    })
    .await
    .expect("server never closed the connection");

    let text = String::from_utf8_lossy(&received);
    assert!(text.contains("\"assets\":["), "fragment missing: {text}");
    assert!(!text.ends_with("0\r\n\r\n"), "stream was terminated cleanly");
    harness.stop().await;
}

#[tokio::test]
async fn delay_holds_the_response() {
    let harness = Harness::start();
    let started = Instant::now();
    let response = harness.get("?delay=500").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(500));
    harness.stop().await;
}

#[tokio::test]
async fn delay_applies_before_induced_error() {
    let harness = Harness::start();
    let started = Instant::now();
    let response = harness.get("?delay=300&error=503").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() >= Duration::from_millis(300));
    harness.stop().await;
}

#[tokio::test]
async fn delay_applies_before_parameter_faults() {
    let harness = Harness::start();
    for query in ["?delay=300&error=abc", "?delay=300&error=700", "?delay=300&size=huge"] {
        let started = Instant::now();
        let response = harness.get(query).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{query}");
        assert!(
            started.elapsed() >= Duration::from_millis(300),
            "{query} answered before its delay"
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Internal Server Error");
    }
    assert_eq!(harness.metrics.requests_for("fault"), 3);
    harness.stop().await;
}

#[tokio::test]
async fn delayed_requests_do_not_block_each_other() {
    let harness = Harness::start();
    let started = Instant::now();
    let slow = async {
        harness.get("?delay=1500").await.bytes().await.unwrap();
        started.elapsed()
    };
    let fast = async {
        harness.get("?delay=0").await.bytes().await.unwrap();
        started.elapsed()
    };
    let (slow_elapsed, fast_elapsed) = tokio::join!(slow, fast);
    assert!(fast_elapsed < slow_elapsed);
    assert!(fast_elapsed < Duration::from_millis(1500));
    assert!(slow_elapsed >= Duration::from_millis(1500));
    harness.stop().await;
}

#[tokio::test]
async fn health_and_fallback_routes() {
    let harness = Harness::start();
    let base = format!("http://{}", harness.server.addr());

    let health: Value = harness
        .client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let missing = harness
        .client
        .get(format!("{base}/api/other"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["path"], "/api/other");
    harness.stop().await;
}
