//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the exporter.
//! All types derive Serde traits for deserialization from config files.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the exporter.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Upstream livecheck endpoint.
    pub target: TargetConfig,

    /// Poll loop settings.
    pub poller: PollerConfig,

    /// Scrape server settings.
    pub server: ServerConfig,

    /// Naming of the exported replication families.
    pub metrics: MetricsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream livecheck endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// URL scheme ("http" or "https").
    pub scheme: String,

    /// IP address or FQDN of the `repd` daemon.
    pub host: String,

    /// Port of the `repd` daemon.
    pub port: u16,

    /// Path to the livecheck resource.
    pub path: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Value sent in the `User-Agent` header.
    pub user_agent: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9000,
            path: "/_/livecheck".to_string(),
            timeout_secs: 5,
            user_agent: concat!("livecheck-exporter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TargetConfig {
    /// Build the full endpoint URL, e.g. `http://10.0.0.1:9000/_/livecheck`.
    pub fn endpoint_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}://{}:{}{}",
            self.scheme, self.host, self.port, self.path
        ))
    }
}

/// How a polled value is applied to an existing gauge.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Add the observed value onto the gauge (values grow with every poll).
    #[default]
    Add,
    /// Overwrite the gauge with the observed value.
    Set,
}

/// What happens to label sets that stop being reported upstream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep every label set ever observed.
    #[default]
    Retain,
    /// Drop label sets missing from the latest successful poll.
    Prune,
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PollerConfig {
    /// Delay between the end of one poll and the start of the next, in milliseconds.
    pub interval_ms: u64,

    /// Gauge update policy.
    pub update_policy: UpdatePolicy,

    /// Label set retention policy.
    pub retention: RetentionPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            update_policy: UpdatePolicy::Add,
            retention: RetentionPolicy::Retain,
        }
    }
}

/// Scrape server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:9284").
    pub bind_address: String,

    /// Path the registry is served on.
    pub metrics_path: String,

    /// Handler timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9284".to_string(),
            metrics_path: "/metrics".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Naming of the replication metric families.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub namespace: String,
    pub subsystem: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: "scality".to_string(),
            subsystem: "metadata_replication".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Append the exporter's own poll telemetry to the scrape output.
    pub self_metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            self_metrics_enabled: true,
        }
    }
}
