//! Livecheck exporter library.
//!
//! Polls the metadata livecheck endpoint of a Scality `repd` daemon and
//! republishes replication health as Prometheus gauges.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod livecheck;
pub mod observability;
pub mod poller;
pub mod projection;

pub use config::schema::ExporterConfig;
pub use http::MetricsServer;
pub use lifecycle::startup::Exporter;
pub use lifecycle::Shutdown;
pub use poller::Poller;
pub use projection::ReplicationMetrics;
