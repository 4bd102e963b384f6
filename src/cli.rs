//! Command-line interface.
//!
//! Flags override values from the optional config file, which override the
//! built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    read_config, validate_config, ConfigError, ExporterConfig, LogFormat, RetentionPolicy,
    UpdatePolicy,
};

#[derive(Parser, Debug, Default)]
#[command(name = "livecheck-exporter")]
#[command(version, about = "Prometheus exporter for Scality metadata replication livecheck", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// IP address or FQDN of the repd daemon
    #[arg(long)]
    pub server: Option<String>,

    /// Port of repd
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to livecheck
    #[arg(long)]
    pub path: Option<String>,

    /// Scheme used to reach repd (http or https)
    #[arg(long)]
    pub scheme: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Address the metrics server listens on
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Delay between polls in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// How polled values are applied to gauges
    #[arg(long, value_enum)]
    pub update_policy: Option<UpdatePolicy>,

    /// Whether label sets that disappear upstream are kept
    #[arg(long, value_enum)]
    pub retention: Option<RetentionPolicy>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Build and validate the effective configuration.
    pub fn resolve_config(&self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ExporterConfig::default(),
        };
        self.apply_overrides(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overwrite every field given on the command line.
    pub fn apply_overrides(&self, config: &mut ExporterConfig) {
        if let Some(server) = &self.server {
            config.target.host = server.clone();
        }
        if let Some(port) = self.port {
            config.target.port = port;
        }
        if let Some(path) = &self.path {
            config.target.path = path.clone();
        }
        if let Some(scheme) = &self.scheme {
            config.target.scheme = scheme.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.target.timeout_secs = timeout;
        }
        if let Some(listen) = &self.listen {
            config.server.bind_address = listen.clone();
        }
        if let Some(interval) = self.interval_ms {
            config.poller.interval_ms = interval;
        }
        if let Some(policy) = self.update_policy {
            config.poller.update_policy = policy;
        }
        if let Some(retention) = self.retention {
            config.poller.retention = retention;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}
