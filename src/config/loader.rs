//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ExporterConfig;
use crate::config::validation::{join_errors, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse a configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<ExporterConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load a configuration file without validating it.
///
/// Command-line overrides are layered on top before validation runs.
pub fn read_config(path: &Path) -> Result<ExporterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
