//! Replication metric registry.
//!
//! Owns the two gauge families the exporter publishes and renders them in the
//! Prometheus text exposition format. One instance is built at startup and
//! shared by `Arc` between the projector (writes) and the scrape handler
//! (reads). Gauge values live in atomics, so a concurrent scrape sees either
//! the old or the new value of each series, never a torn one.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::config::MetricsConfig;

/// Labels of the `replication_status` family.
pub const STATUS_LABELS: [&str; 3] = ["id", "leader", "port"];

/// Labels of the `peer_connection` family.
pub const PEER_LABELS: [&str; 5] = ["id", "leader", "port", "connection_to", "connection_path"];

/// Errors raised while building or rendering the registry.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("exposition output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The exported gauge families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Whether a session can replicate.
    ReplicationStatus,
    /// Whether a session is connected to a given peer.
    PeerConnection,
}

impl Family {
    fn short_name(self) -> &'static str {
        match self {
            Family::ReplicationStatus => "replication_status",
            Family::PeerConnection => "peer_connection",
        }
    }
}

/// Explicit registry holding the replication gauge families.
pub struct ReplicationMetrics {
    registry: Registry,
    replication_status: GaugeVec,
    peer_connection: GaugeVec,
    prefix: String,
}

impl ReplicationMetrics {
    /// Create and register both families under `{namespace}_{subsystem}_`.
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let replication_status = GaugeVec::new(
            Opts::new(
                Family::ReplicationStatus.short_name(),
                "Status for Scality raft replication status",
            )
            .namespace(config.namespace.as_str())
            .subsystem(config.subsystem.as_str()),
            &STATUS_LABELS,
        )?;
        registry.register(Box::new(replication_status.clone()))?;

        let peer_connection = GaugeVec::new(
            Opts::new(
                Family::PeerConnection.short_name(),
                "Status for Scality raft session peering",
            )
            .namespace(config.namespace.as_str())
            .subsystem(config.subsystem.as_str()),
            &PEER_LABELS,
        )?;
        registry.register(Box::new(peer_connection.clone()))?;

        Ok(Self {
            registry,
            replication_status,
            peer_connection,
            prefix: format!("{}_{}_", config.namespace, config.subsystem),
        })
    }

    /// The `replication_status` gauge family.
    pub fn replication_status(&self) -> &GaugeVec {
        &self.replication_status
    }

    /// The `peer_connection` gauge family.
    pub fn peer_connection(&self) -> &GaugeVec {
        &self.peer_connection
    }

    /// Fully qualified name of a family, e.g. `scality_metadata_replication_peer_connection`.
    pub fn family_name(&self, family: Family) -> String {
        format!("{}{}", self.prefix, family.short_name())
    }

    /// Render every family in the Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Current value of one series, or `None` if it has never been created
    /// (or was pruned). Reading never creates a series.
    pub fn sample(&self, family: Family, labels: &[(&str, &str)]) -> Option<f64> {
        let name = self.family_name(family);
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == name)
            .flat_map(|mf| mf.get_metric())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(k, v)| {
                        pairs
                            .iter()
                            .any(|pair| pair.get_name() == *k && pair.get_value() == *v)
                    })
            })
            .map(|metric| metric.get_gauge().value())
    }

    /// Number of live series in a family.
    pub fn series_count(&self, family: Family) -> usize {
        let name = self.family_name(family);
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == name)
            .map(|mf| mf.get_metric().len())
            .sum()
    }
}
