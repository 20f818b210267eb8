//! ---
//! por_section: "04-consumer-probe"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Consumer-contract probe for the PoR mock."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
//! Reproduces the oracle's acceptance rules so a scenario's effect on the
//! consumer can be checked without running the oracle itself.

pub mod matrix;
pub mod outcome;
pub mod probe;

pub use matrix::{run_matrix, MatrixRow};
pub use outcome::{expected_verdict, ProbeOutcome, Verdict};
pub use probe::{check_report, probe, ConsumerLimits, ProbeError, ProbeRequest, RESERVES_PATH};
