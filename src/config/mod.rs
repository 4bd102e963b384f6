//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (cli.rs)
//!     → validation.rs (semantic checks, run by Cli::resolve_config)
//!     → ExporterConfig (validated, immutable)
//!     → cloned into the poller and the scrape server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so the exporter runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{parse_config, read_config, ConfigError};
pub use schema::{
    ExporterConfig, LogFormat, MetricsConfig, ObservabilityConfig, PollerConfig, RetentionPolicy,
    ServerConfig, TargetConfig, UpdatePolicy,
};
pub use validation::{validate_config, ValidationError};
