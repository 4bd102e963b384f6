//! Livecheck exporter (v1)
//!
//! Translates the replication livecheck of a Scality metadata cluster into
//! Prometheus metrics.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────── livecheck-exporter ────────────────────────┐
//!   │                                                                     │
//!   │  ┌────────┐   every 2s   ┌───────────┐  Vec<Session>  ┌──────────┐ │
//!   │  │ poller │─────────────▶│ livecheck │───────────────▶│projector │ │   POST /_/livecheck
//!   │  │  task  │              │  client   │◀───────────────┼──────────┼─┼──────────────────▶ repd
//!   │  └────────┘              └───────────┘                └────┬─────┘ │
//!   │                                                            │ add/set│
//!   │                                                            ▼       │
//!   │  ┌──────────────┐   render    ┌──────────────────────────────────┐ │
//!   │  │ axum server  │◀────────────│ ReplicationMetrics (Arc, shared) │ │
//!   │  │ GET /metrics │             └──────────────────────────────────┘ │
//!   │  └──────┬───────┘                                                   │
//!   └─────────┼───────────────────────────────────────────────────────────┘
//!             ▼
//!         Prometheus
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use livecheck_exporter::cli::Cli;
use livecheck_exporter::lifecycle::signals;
use livecheck_exporter::observability::{logging, metrics};
use livecheck_exporter::{Exporter, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability)?;

    tracing::info!("livecheck-exporter v{} starting", env!("CARGO_PKG_VERSION"));

    let self_metrics_enabled = config.observability.self_metrics_enabled;
    let mut exporter = Exporter::new(config)?;
    if self_metrics_enabled {
        exporter = exporter.with_self_metrics(metrics::init_metrics()?);
    }

    let listener = TcpListener::bind(&exporter.config().server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        path = %exporter.config().server.metrics_path,
        "Listening for scrapes"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    exporter.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
