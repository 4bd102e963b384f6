//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the landing page and the metrics handler
//! - Wire up middleware (tracing, handler timeout)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::shutdown;
use crate::projection::{MetricsError, ReplicationMetrics};

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<ReplicationMetrics>,
    pub self_metrics: Option<PrometheusHandle>,
    pub metrics_path: String,
}

impl AppState {
    /// Render the replication families followed by the self-telemetry.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut body = self.metrics.render()?;
        if let Some(handle) = &self.self_metrics {
            body.push_str(&handle.render());
        }
        Ok(body)
    }
}

/// HTTP server exposing the registry for scraping.
pub struct MetricsServer {
    router: Router,
}

impl MetricsServer {
    /// Create a new server over the given registry.
    pub fn new(
        config: &ServerConfig,
        metrics: Arc<ReplicationMetrics>,
        self_metrics: Option<PrometheusHandle>,
    ) -> Self {
        let state = AppState {
            metrics,
            self_metrics,
            metrics_path: config.metrics_path.clone(),
        };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(landing_handler))
            .route(&config.metrics_path, get(metrics_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Metrics server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("Metrics server stopped");
        Ok(())
    }
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.render() {
        Ok(body) => ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to render metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn landing_handler(State(state): State<AppState>) -> impl IntoResponse {
    format!(
        "Livecheck exporter for Scality metadata replication\nMetrics: {}\n",
        state.metrics_path
    )
}
