//! ---
//! por_section: "01-core-functionality"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Shared primitives for the fixture binaries."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
//! Configuration loading and tracing initialisation shared by `por-mockd`
//! and `por-mockctl`.

pub mod config;
pub mod logging;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig, MetricsConfig, ServerConfig};
pub use logging::{init_cli, init_tracing, LogFormat};
