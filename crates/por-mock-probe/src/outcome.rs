//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Probe outcomes and the verdict expected for each scenario."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::fmt;

use por_mock_scenarios::Scenario;
use strum::{Display, EnumString};

/// Whether the consumer would use a response or discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

/// What the consumer made of a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Report passed every check.
    Accepted { assets: usize, bytes: usize },
    /// Upstream answered with a status other than 200.
    HttpStatus(u16),
    /// Body grew past the consumer's cap.
    Oversized { bytes: usize, limit: usize },
    /// Body did not parse as JSON.
    NotJson(String),
    /// JSON parsed but is not a usable report.
    SchemaViolation(String),
    /// Connection failed or the body stream broke off.
    Transport(String),
    /// Nothing complete arrived within the request timeout.
    TimedOut,
}

impl ProbeOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            ProbeOutcome::Accepted { .. } => Verdict::Accept,
            _ => Verdict::Reject,
        }
    }

    /// Short machine-friendly tag, used in logs and CLI tables.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Accepted { .. } => "accepted",
            ProbeOutcome::HttpStatus(_) => "http_status",
            ProbeOutcome::Oversized { .. } => "oversized",
            ProbeOutcome::NotJson(_) => "not_json",
            ProbeOutcome::SchemaViolation(_) => "schema_violation",
            ProbeOutcome::Transport(_) => "transport",
            ProbeOutcome::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Accepted { assets, bytes } => {
                write!(f, "accepted ({assets} assets, {bytes} bytes)")
            }
            ProbeOutcome::HttpStatus(code) => write!(f, "rejected: HTTP {code}"),
            ProbeOutcome::Oversized { bytes, limit } => {
                write!(f, "rejected: {bytes} bytes exceeds {limit} byte limit")
            }
            ProbeOutcome::NotJson(reason) => write!(f, "rejected: not JSON ({reason})"),
            ProbeOutcome::SchemaViolation(reason) => write!(f, "rejected: {reason}"),
            ProbeOutcome::Transport(reason) => write!(f, "rejected: transport error ({reason})"),
            ProbeOutcome::TimedOut => write!(f, "rejected: timed out"),
        }
    }
}

/// Verdict a correctly behaving consumer reaches for `scenario` under the
/// default [`ConsumerLimits`](crate::ConsumerLimits).
///
/// `at_limit` is a reject: its body lands 13 bytes past 100 KiB.
pub fn expected_verdict(scenario: Scenario) -> Verdict {
    match scenario {
        Scenario::UnderLimit
        | Scenario::UnderConnectionTimeout
        | Scenario::WrongContentType
        | Scenario::Underbacked => Verdict::Accept,
        Scenario::AtLimit
        | Scenario::ExceedsLimit
        | Scenario::WayOverLimit
        | Scenario::ConnectionTimeout
        | Scenario::InvalidJson
        | Scenario::EmptyResponse
        | Scenario::PartialJson
        | Scenario::MissingFields
        | Scenario::InvalidTypes
        | Scenario::NullValues
        | Scenario::NegativeValues
        | Scenario::ConnectionAbort => Verdict::Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_accepted_accepts() {
        assert_eq!(
            ProbeOutcome::Accepted { assets: 1, bytes: 10 }.verdict(),
            Verdict::Accept
        );
        assert_eq!(ProbeOutcome::TimedOut.verdict(), Verdict::Reject);
        assert_eq!(ProbeOutcome::HttpStatus(200).verdict(), Verdict::Reject);
    }

    #[test]
    fn four_presets_are_accepted() {
        let accepted: Vec<_> = Scenario::iter()
            .filter(|scenario| expected_verdict(*scenario) == Verdict::Accept)
            .map(Scenario::name)
            .collect();
        assert_eq!(
            accepted,
            [
                "under_limit",
                "under_connection_timeout",
                "wrong_content_type",
                "underbacked"
            ]
        );
    }

    #[test]
    fn display_carries_detail() {
        let outcome = ProbeOutcome::Oversized {
            bytes: 102_413,
            limit: 102_400,
        };
        assert_eq!(
            outcome.to_string(),
            "rejected: 102413 bytes exceeds 102400 byte limit"
        );
        assert_eq!(outcome.label(), "oversized");
        assert_eq!(Verdict::Reject.to_string(), "reject");
    }
}
