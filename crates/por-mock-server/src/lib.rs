//! ---
//! por_section: "03-http-surface"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "HTTP surface of the PoR mock fixture."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
//! Serves `/api/reserves` scenarios, `/health`, and a JSON 404 for anything
//! else. Each request is resolved independently from its own query string.

pub mod fault;
pub mod metrics;
pub mod server;
pub mod transport;

pub use fault::FixtureFault;
pub use metrics::{new_registry, spawn_metrics_server, FixtureMetrics, MetricsServer, SharedRegistry};
pub use server::{router, spawn_fixture_server, FixtureServer, FixtureState};
