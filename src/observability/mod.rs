//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Poller and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (poll counters, durations, session gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, after the replication families)
//! ```
//!
//! # Design Decisions
//! - Structured logging with key/value fields for machine parsing
//! - Self-telemetry is separate from the replication registry
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
