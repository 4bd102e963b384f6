//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Check that the target URL and bind address can be built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ExporterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ExporterConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target.scheme must be \"http\" or \"https\", got {0:?}")]
    UnsupportedScheme(String),

    #[error("target.host must not be empty")]
    EmptyHost,

    #[error("{field} must start with '/', got {value:?}")]
    RelativePath { field: &'static str, value: String },

    #[error("target endpoint is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("server.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("metrics.{0} must be non-empty and contain only [a-zA-Z0-9_]")]
    InvalidMetricName(&'static str),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ExporterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = &config.target;
    if target.scheme != "http" && target.scheme != "https" {
        errors.push(ValidationError::UnsupportedScheme(target.scheme.clone()));
    }
    if target.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if !target.path.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field: "target.path",
            value: target.path.clone(),
        });
    }
    if target.timeout_secs == 0 {
        errors.push(ValidationError::Zero("target.timeout_secs"));
    }
    // Only worth reporting once the individual parts look sane.
    if errors.is_empty() {
        if let Err(e) = target.endpoint_url() {
            errors.push(ValidationError::InvalidUrl(e.to_string()));
        }
    }

    if config.poller.interval_ms == 0 {
        errors.push(ValidationError::Zero("poller.interval_ms"));
    }

    let server = &config.server;
    if server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(server.bind_address.clone()));
    }
    if !server.metrics_path.starts_with('/') || server.metrics_path == "/" {
        errors.push(ValidationError::RelativePath {
            field: "server.metrics_path",
            value: server.metrics_path.clone(),
        });
    }
    if server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("server.request_timeout_secs"));
    }

    if !is_metric_name_part(&config.metrics.namespace) {
        errors.push(ValidationError::InvalidMetricName("namespace"));
    }
    if !is_metric_name_part(&config.metrics.subsystem) {
        errors.push(ValidationError::InvalidMetricName("subsystem"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Render a list of validation errors as one comma-separated line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_metric_name_part(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
