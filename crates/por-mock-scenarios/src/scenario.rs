//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Named scenario presets and their response plans."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ScenarioError;
use crate::plan::{ContentType, ResponsePlan, Transport};
use crate::report::{iso_now, negative_report, normal_report, sized_report, underbacked_report};

/// Stall applied by `connection_timeout`; past a 10 s client timeout.
pub const CONNECTION_TIMEOUT_STALL: Duration = Duration::from_millis(11_000);
/// Stall applied by `under_connection_timeout`; inside a 10 s client timeout.
pub const UNDER_CONNECTION_TIMEOUT_STALL: Duration = Duration::from_millis(9_000);
/// Pause between the abort fragment and the socket teardown.
pub const ABORT_LINGER: Duration = Duration::from_millis(100);

const INVALID_JSON_BODY: &str =
    r#"{"timestamp": "2024-01-01T00:00:00.000Z", "assets": [{"assetId": "wbtc", "totalSupply": 15000,}], "status": FULLY_BACKED"#;

/// Named preset selecting both payload shape and transport behaviour.
///
/// Parsed from the `scenario` query parameter by its snake_case name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    UnderLimit,
    AtLimit,
    ExceedsLimit,
    WayOverLimit,
    ConnectionTimeout,
    UnderConnectionTimeout,
    InvalidJson,
    EmptyResponse,
    WrongContentType,
    PartialJson,
    MissingFields,
    InvalidTypes,
    NullValues,
    NegativeValues,
    Underbacked,
    ConnectionAbort,
}

impl Scenario {
    /// Look up a preset by wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Build the response this preset emits.
    pub fn plan(self) -> Result<ResponsePlan, ScenarioError> {
        match self {
            Scenario::UnderLimit => ResponsePlan::json(&sized_report(99)?),
            Scenario::AtLimit => ResponsePlan::json(&sized_report(100)?),
            Scenario::ExceedsLimit => ResponsePlan::json(&sized_report(150)?),
            Scenario::WayOverLimit => ResponsePlan::json(&sized_report(500)?),
            Scenario::ConnectionTimeout => Ok(ResponsePlan::json(&normal_report())?
                .with_transport(Transport::Stall(CONNECTION_TIMEOUT_STALL))),
            Scenario::UnderConnectionTimeout => Ok(ResponsePlan::json(&normal_report())?
                .with_transport(Transport::Stall(UNDER_CONNECTION_TIMEOUT_STALL))),
            Scenario::InvalidJson => Ok(ResponsePlan::raw(INVALID_JSON_BODY)),
            Scenario::EmptyResponse => Ok(ResponsePlan::raw(Bytes::new())),
            Scenario::WrongContentType => Ok(ResponsePlan::json(&normal_report())?
                .with_content_type(ContentType::PlainText)),
            Scenario::PartialJson => {
                Ok(ResponsePlan::json(&normal_report())?.with_transport(Transport::TruncateHalf))
            }
            Scenario::MissingFields => ResponsePlan::json(&json!({ "timestamp": iso_now() })),
            Scenario::InvalidTypes => ResponsePlan::json(&json!({
                "timestamp": 1_704_067_200_000u64,
                "assets": "not-an-array",
                "status": true,
            })),
            Scenario::NullValues => ResponsePlan::json(&json!({
                "timestamp": null,
                "assets": null,
                "status": null,
            })),
            Scenario::NegativeValues => ResponsePlan::json(&negative_report()),
            Scenario::Underbacked => ResponsePlan::json(&underbacked_report()),
            Scenario::ConnectionAbort => Ok(ResponsePlan::raw(abort_fragment())
                .with_transport(Transport::Abort {
                    linger: ABORT_LINGER,
                })),
        }
    }
}

/// Opening bytes of a report, cut off inside the first asset.
fn abort_fragment() -> String {
    format!(
        r#"{{"timestamp":"{}","assets":[{{"assetId":"wbtc","name":"Wrapped"#,
        iso_now()
    )
}
