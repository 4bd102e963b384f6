//! Projection of livecheck snapshots onto gauges.
//!
//! # Data Flow
//! ```text
//! Vec<Session> (one successful poll)
//!     → projector.rs (derive label sets, apply add/set policy)
//!     → registry.rs (replication_status + peer_connection gauge families)
//!     → rendered by the scrape handler on demand
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit object shared by `Arc`, not process-global
//! - Series are created lazily on first observation
//! - Retention of vanished label sets is a policy: retain forever or prune

pub mod projector;
pub mod registry;

pub use projector::{connection_path, PeerKey, ProjectionSummary, Projector, StatusKey};
pub use registry::{Family, MetricsError, ReplicationMetrics};
