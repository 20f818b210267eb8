//! ---
//! por_section: "03-http-surface"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Applies a response plan's transport behaviour to the socket."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::io;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use por_mock_scenarios::{ResponsePlan, Transport};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::fault::FixtureFault;
use crate::metrics::FixtureMetrics;

/// Turn a plan into the response axum writes out.
///
/// `Stall` is served here by sleeping inside the request's own task, so other
/// connections keep being answered. `Abort` produces a streaming body whose
/// second poll fails; hyper then drops the connection without the final
/// chunk, which the client sees as a transport error rather than a status.
pub async fn execute(plan: ResponsePlan, metrics: &FixtureMetrics) -> Result<Response, FixtureFault> {
    let status = StatusCode::from_u16(plan.status)
        .map_err(|_| FixtureFault::Status(plan.status))?;
    let body = match plan.transport {
        Transport::Complete => Body::from(plan.body),
        Transport::TruncateHalf => Body::from(plan.wire_body()),
        Transport::Stall(stall) => {
            info!(delay_ms = stall.as_millis() as u64, source = "scenario", "stalling response");
            metrics.observe_delay(stall);
            sleep(stall).await;
            Body::from(plan.body)
        }
        Transport::Abort { linger } => {
            metrics.record_abort();
            aborting_body(plan.body, linger)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(plan.content_type.header_value()),
    );
    Ok(response)
}

fn aborting_body(fragment: Bytes, linger: Duration) -> Body {
    let head = stream::once(async move { Ok::<Bytes, io::Error>(fragment) });
    let tail = stream::once(async move {
        sleep(linger).await;
        warn!(linger_ms = linger.as_millis() as u64, "aborting connection mid-response");
        Err(io::Error::new(
            io::ErrorKind::ConnectionAborted,
            "connection_abort scenario",
        ))
    });
    Body::from_stream(head.chain(tail))
}
