//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Query parameter precedence and selector resolution."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::time::Duration;

use serde::Deserialize;

use crate::error::ScenarioError;
use crate::induced::error_body;
use crate::plan::ResponsePlan;
use crate::report::{normal_report, sized_report};
use crate::scenario::Scenario;

/// Raw query parameters of a reserves request.
///
/// Values stay strings so malformed numbers surface as [`ScenarioError`]
/// instead of an extractor rejection. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioQuery {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub delay: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Which branch of the precedence chain answers the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `error=<code>`.
    Status(u16),
    /// `size=<KiB>`.
    Size(u64),
    /// `scenario=<name>` with a known name.
    Preset(Scenario),
    /// Nothing selected, or an unknown scenario name.
    Default,
}

impl Selector {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Selector::Status(_) => "error",
            Selector::Size(_) => "size",
            Selector::Preset(scenario) => scenario.name(),
            Selector::Default => "default",
        }
    }

    /// Build the response for this branch.
    pub fn plan(&self) -> Result<ResponsePlan, ScenarioError> {
        match *self {
            Selector::Status(code) => ResponsePlan::json_with_status(code, &error_body(code)),
            Selector::Size(kib) => ResponsePlan::json(&sized_report(kib)?),
            Selector::Preset(scenario) => scenario.plan(),
            Selector::Default => ResponsePlan::json(&normal_report()),
        }
    }
}

/// Outcome of reading a query: an up-front delay plus the answering branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Applied before anything else, whatever the selector.
    pub delay: Option<Duration>,
    pub selector: Selector,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_number(param: &'static str, value: &str) -> Result<u64, ScenarioError> {
    value
        .parse::<u64>()
        .map_err(|_| ScenarioError::InvalidParameter {
            param,
            value: value.to_owned(),
        })
}

/// Read `delay`, the only parameter that applies whatever else is set.
///
/// Callers wait out the delay before calling [`select`], so faults in the
/// other parameters surface only after it.
pub fn resolve_delay(query: &ScenarioQuery) -> Result<Option<Duration>, ScenarioError> {
    present(&query.delay)
        .map(|raw| parse_number("delay", raw).map(Duration::from_millis))
        .transpose()
}

/// Pick the answering branch: `error`, then `size`, then `scenario`, then
/// the default report.
///
/// Parameters shadowed by a higher-precedence one are never parsed.
pub fn select(query: &ScenarioQuery) -> Result<Selector, ScenarioError> {
    if let Some(raw) = present(&query.error) {
        let code = parse_number("error", raw)?;
        if !(200..=599).contains(&code) {
            return Err(ScenarioError::InvalidStatus(code));
        }
        return Ok(Selector::Status(code as u16));
    }
    if let Some(raw) = present(&query.size) {
        return Ok(Selector::Size(parse_number("size", raw)?));
    }
    Ok(present(&query.scenario)
        .and_then(Scenario::from_name)
        .map(Selector::Preset)
        .unwrap_or(Selector::Default))
}

/// [`resolve_delay`] and [`select`] in one step, for callers that do not
/// sleep in between.
pub fn resolve(query: &ScenarioQuery) -> Result<Resolution, ScenarioError> {
    Ok(Resolution {
        delay: resolve_delay(query)?,
        selector: select(query)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ScenarioQuery {
        let mut query = ScenarioQuery::default();
        for (key, value) in pairs {
            let slot = match *key {
                "scenario" => &mut query.scenario,
                "delay" => &mut query.delay,
                "error" => &mut query.error,
                "size" => &mut query.size,
                other => panic!("unexpected key {other}"),
            };
            *slot = Some((*value).to_owned());
        }
        query
    }

    #[test]
    fn empty_query_selects_default() {
        let resolution = resolve(&ScenarioQuery::default()).unwrap();
        assert_eq!(resolution.delay, None);
        assert_eq!(resolution.selector, Selector::Default);
    }

    #[test]
    fn error_beats_size_and_scenario() {
        let resolution =
            resolve(&query(&[("error", "503"), ("size", "10"), ("scenario", "at_limit")]))
                .unwrap();
        assert_eq!(resolution.selector, Selector::Status(503));
    }

    #[test]
    fn size_beats_scenario() {
        let resolution = resolve(&query(&[("size", "10"), ("scenario", "invalid_json")])).unwrap();
        assert_eq!(resolution.selector, Selector::Size(10));
    }

    #[test]
    fn delay_accompanies_any_selector() {
        let resolution = resolve(&query(&[("delay", "250"), ("error", "404")])).unwrap();
        assert_eq!(resolution.delay, Some(Duration::from_millis(250)));
        assert_eq!(resolution.selector, Selector::Status(404));
    }

    #[test]
    fn unknown_scenario_falls_through() {
        let resolution = resolve(&query(&[("scenario", "does_not_exist")])).unwrap();
        assert_eq!(resolution.selector, Selector::Default);
    }

    #[test]
    fn blank_values_are_absent() {
        let resolution = resolve(&query(&[("delay", ""), ("error", " "), ("size", "")])).unwrap();
        assert_eq!(resolution.delay, None);
        assert_eq!(resolution.selector, Selector::Default);
    }

    #[test]
    fn malformed_numbers_are_faults() {
        let err = resolve(&query(&[("delay", "soon")])).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidParameter { param: "delay", .. }));
        let err = resolve(&query(&[("size", "-1")])).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidParameter { param: "size", .. }));
        let err = resolve(&query(&[("error", "700")])).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidStatus(700)));
    }

    #[test]
    fn delay_reads_independently_of_faulty_selector() {
        let faulty = query(&[("delay", "300"), ("error", "abc")]);
        assert_eq!(
            resolve_delay(&faulty).unwrap(),
            Some(Duration::from_millis(300))
        );
        assert!(matches!(
            select(&faulty),
            Err(ScenarioError::InvalidParameter { param: "error", .. })
        ));
    }

    #[test]
    fn shadowed_parameters_are_not_parsed() {
        let resolution = resolve(&query(&[("error", "500"), ("size", "lots")])).unwrap();
        assert_eq!(resolution.selector, Selector::Status(500));
    }

    #[test]
    fn status_plan_uses_requested_code() {
        let plan = Selector::Status(418).plan().unwrap();
        assert_eq!(plan.status, 418);
        assert_eq!(
            plan.body.as_ref(),
            br#"{"error":"Error","message":"An error occurred"}"#
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Selector::Status(500).label(), "error");
        assert_eq!(Selector::Size(1).label(), "size");
        assert_eq!(Selector::Preset(Scenario::AtLimit).label(), "at_limit");
        assert_eq!(Selector::Default.label(), "default");
    }
}
