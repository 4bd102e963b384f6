//! Scrape endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! GET /metrics
//!     → server.rs (Axum router, trace + timeout layers)
//!     → ReplicationMetrics::render (replication families)
//!     → PrometheusHandle::render (exporter self-telemetry, optional)
//!     → text/plain exposition body
//! ```
//!
//! # Design Decisions
//! - Scrapes never see poll failures; they read whatever the registry holds
//! - Rendering happens per request; nothing is cached between scrapes

pub mod server;

pub use server::{AppState, MetricsServer, EXPOSITION_CONTENT_TYPE};
