//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Probes every scenario and compares against expected verdicts."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use futures::future::join_all;
use por_mock_scenarios::Scenario;
use reqwest::Client;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::outcome::{expected_verdict, ProbeOutcome, Verdict};
use crate::probe::{probe, ConsumerLimits, ProbeError, ProbeRequest};

/// Result of probing one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub scenario: Scenario,
    pub expected: Verdict,
    pub outcome: ProbeOutcome,
}

impl MatrixRow {
    pub fn matches(&self) -> bool {
        self.outcome.verdict() == self.expected
    }
}

/// Probe every named scenario under `base` concurrently.
///
/// Rows come back in declaration order regardless of completion order.
pub async fn run_matrix(
    client: &Client,
    base: &str,
    limits: &ConsumerLimits,
) -> Result<Vec<MatrixRow>, ProbeError> {
    let targets = Scenario::iter()
        .map(|scenario| Ok((scenario, ProbeRequest::for_scenario(scenario).url(base)?)))
        .collect::<Result<Vec<_>, ProbeError>>()?;

    let rows = join_all(targets.into_iter().map(|(scenario, url)| async move {
        let outcome = probe(client, url, limits).await;
        let row = MatrixRow {
            scenario,
            expected: expected_verdict(scenario),
            outcome,
        };
        if row.matches() {
            info!(scenario = %scenario, outcome = row.outcome.label(), "verdict as expected");
        } else {
            warn!(
                scenario = %scenario,
                expected = %row.expected,
                outcome = %row.outcome,
                "verdict mismatch"
            );
        }
        row
    }))
    .await;
    Ok(rows)
}
