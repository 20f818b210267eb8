//! ---
//! por_section: "03-http-surface"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Generic internal-fault response."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use por_mock_scenarios::ScenarioError;
use serde::Serialize;
use tracing::error;

/// Anything that stops the fixture from producing its configured behaviour.
#[derive(Debug, thiserror::Error)]
pub enum FixtureFault {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("malformed query string: {0}")]
    Query(String),
    #[error("status code {0} cannot be sent")]
    Status(u16),
}

#[derive(Debug, Serialize)]
struct FaultBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for FixtureFault {
    fn into_response(self) -> Response {
        error!(error = %self, "request fault");
        let body = Json(FaultBody {
            error: "Internal Server Error",
            message: self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
