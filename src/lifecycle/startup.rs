//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the replication registry and the livecheck client
//! - Start the background poller, then serve scrapes
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener is bound by the caller so tests can use port 0

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::join_errors;
use crate::config::{validate_config, ExporterConfig, ValidationError};
use crate::http::MetricsServer;
use crate::lifecycle::Shutdown;
use crate::livecheck::{ClientConfigError, LivecheckClient};
use crate::poller::Poller;
use crate::projection::{MetricsError, ReplicationMetrics};

/// Fatal errors while bringing the exporter up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("failed to build livecheck client: {0}")]
    Client(#[from] ClientConfigError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired exporter, ready to run.
pub struct Exporter {
    config: ExporterConfig,
    metrics: Arc<ReplicationMetrics>,
    self_metrics: Option<PrometheusHandle>,
}

impl Exporter {
    /// Validate the configuration and build the replication registry.
    pub fn new(config: ExporterConfig) -> Result<Self, StartupError> {
        validate_config(&config).map_err(StartupError::Config)?;
        let metrics = Arc::new(ReplicationMetrics::new(&config.metrics)?);

        Ok(Self {
            config,
            metrics,
            self_metrics: None,
        })
    }

    /// Append the given self-telemetry to every scrape.
    pub fn with_self_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.self_metrics = Some(handle);
        self
    }

    /// The registry shared by the poller and the scrape server.
    pub fn metrics(&self) -> &Arc<ReplicationMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Spawn the poller and serve scrapes on `listener` until shutdown.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        let client = LivecheckClient::from_config(&self.config.target)?;
        tracing::info!(
            url = %client.url(),
            interval_ms = self.config.poller.interval_ms,
            update_policy = ?self.config.poller.update_policy,
            retention = ?self.config.poller.retention,
            "Livecheck target configured"
        );

        let poller = Poller::from_config(client, self.metrics.clone(), &self.config.poller);
        let poller_task = tokio::spawn(poller.run(shutdown.subscribe()));

        let server = MetricsServer::new(&self.config.server, self.metrics, self.self_metrics);
        let served = server.run(listener, shutdown.subscribe()).await;

        // The server may have stopped on its own; make sure the poller follows.
        shutdown.trigger();
        if let Err(e) = poller_task.await {
            tracing::error!(error = %e, "Poller task failed");
        }

        served?;
        Ok(())
    }
}
