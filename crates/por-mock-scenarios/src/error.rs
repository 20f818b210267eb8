//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Faults raised while resolving or rendering a scenario."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---

/// Faults that end a fixture request with the generic 500 response.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A numeric query parameter could not be parsed.
    #[error("invalid {param} value '{value}': expected a non-negative integer")]
    InvalidParameter { param: &'static str, value: String },
    /// `error=` named a code HTTP cannot carry.
    #[error("invalid status code {0}: must be between 200 and 599")]
    InvalidStatus(u64),
    /// `size=` beyond what the fixture is willing to allocate.
    #[error("size {requested} KiB exceeds the {max} KiB ceiling")]
    SizeOutOfRange { requested: u64, max: u64 },
    /// Payload serialisation failed.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
