//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Payload builders and scenario dispatch for the PoR mock."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
//! Pure side of the fixture: reserve report builders, the closed set of
//! named scenarios, and the query precedence that picks one of them. Nothing
//! here touches a socket or a clock other than for timestamps.

pub mod dispatch;
pub mod error;
pub mod induced;
pub mod plan;
pub mod report;
pub mod scenario;

pub use dispatch::{resolve, resolve_delay, select, Resolution, ScenarioQuery, Selector};
pub use error::ScenarioError;
pub use induced::{error_body, ErrorBody};
pub use plan::{ContentType, ResponsePlan, Transport};
pub use report::{
    iso_now, negative_report, normal_report, sized_report, underbacked_report, BackingStatus,
    ReserveAsset, ReserveReport, MAX_SIZED_KIB, PADDING_FIELD_OVERHEAD,
};
pub use scenario::Scenario;
