//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Fetches a reserves URL and applies the consumer's acceptance rules."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::time::Duration;

use por_mock_scenarios::Scenario;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use crate::outcome::ProbeOutcome;

/// Path of the reserves endpoint relative to the server root.
pub const RESERVES_PATH: &str = "api/reserves/";

/// Failures that prevent a probe from being attempted at all.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid base url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Limits the oracle consumer enforces on every upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerLimits {
    /// Largest accepted body, inclusive.
    pub max_body_bytes: usize,
    /// Deadline for the whole exchange, body included.
    pub request_timeout: Duration,
}

impl Default for ConsumerLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 100 * 1024,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Query parameters for one reserves request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeRequest {
    pub scenario: Option<String>,
    pub delay: Option<u64>,
    pub error: Option<u16>,
    pub size: Option<u64>,
}

impl ProbeRequest {
    pub fn for_scenario(scenario: Scenario) -> Self {
        Self {
            scenario: Some(scenario.name().to_owned()),
            ..Self::default()
        }
    }

    /// Reserves URL under `base` carrying the populated parameters.
    pub fn url(&self, base: &str) -> Result<Url, ProbeError> {
        let invalid = |source| ProbeError::InvalidUrl {
            url: base.to_owned(),
            source,
        };
        let mut root = Url::parse(base).map_err(invalid)?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let mut url = root.join(RESERVES_PATH).map_err(invalid)?;

        let mut pairs = Vec::new();
        if let Some(scenario) = &self.scenario {
            pairs.push(("scenario", scenario.clone()));
        }
        if let Some(delay) = self.delay {
            pairs.push(("delay", delay.to_string()));
        }
        if let Some(error) = self.error {
            pairs.push(("error", error.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

/// Fetch `url` the way the oracle consumer does and report what it concluded.
pub async fn probe(client: &Client, url: Url, limits: &ConsumerLimits) -> ProbeOutcome {
    debug!(url = %url, "probing");
    match timeout(limits.request_timeout, fetch(client, url, limits.max_body_bytes)).await {
        Ok(outcome) => outcome,
        Err(_) => ProbeOutcome::TimedOut,
    }
}

async fn fetch(client: &Client, url: Url, max_body_bytes: usize) -> ProbeOutcome {
    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => return transport_failure(err),
    };
    if response.status() != StatusCode::OK {
        return ProbeOutcome::HttpStatus(response.status().as_u16());
    }

    // Oversized bodies are drained and counted but never buffered.
    let mut body = Vec::new();
    let mut received = 0usize;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                received += chunk.len();
                if received <= max_body_bytes {
                    body.extend_from_slice(&chunk);
                }
            }
            Ok(None) => break,
            Err(err) => return transport_failure(err),
        }
    }
    if received > max_body_bytes {
        return ProbeOutcome::Oversized {
            bytes: received,
            limit: max_body_bytes,
        };
    }
    check_report(&body)
}

fn transport_failure(err: reqwest::Error) -> ProbeOutcome {
    if err.is_timeout() {
        ProbeOutcome::TimedOut
    } else {
        ProbeOutcome::Transport(err.to_string())
    }
}

/// Apply the schema rules to an already received body.
pub fn check_report(body: &[u8]) -> ProbeOutcome {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => return ProbeOutcome::NotJson(err.to_string()),
    };
    match validate_report(&value) {
        Ok(assets) => ProbeOutcome::Accepted {
            assets,
            bytes: body.len(),
        },
        Err(reason) => ProbeOutcome::SchemaViolation(reason),
    }
}

fn validate_report(value: &Value) -> Result<usize, String> {
    let report = value
        .as_object()
        .ok_or_else(|| "report is not a JSON object".to_owned())?;
    if !report.get("timestamp").is_some_and(Value::is_string) {
        return Err("timestamp missing or not a string".to_owned());
    }
    let assets = report
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| "assets missing or not an array".to_owned())?;
    if assets.is_empty() {
        return Err("assets is empty".to_owned());
    }
    for (index, asset) in assets.iter().enumerate() {
        decimal_field(asset, index, "totalSupply")?;
        let reserves = decimal_field(asset, index, "totalReserves")?;
        if reserves < 0.0 {
            return Err(format!("assets[{index}].totalReserves is negative"));
        }
    }
    Ok(assets.len())
}

fn decimal_field(asset: &Value, index: usize, field: &str) -> Result<f64, String> {
    asset
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| format!("assets[{index}].{field} is not a decimal string"))
}
