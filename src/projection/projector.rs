//! Session-to-gauge projection.
//!
//! # Responsibilities
//! - Derive the label sets for each session and peer edge
//! - Apply replicability and connectivity values to the registry
//! - Optionally prune label sets that disappeared since the last pass

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{RetentionPolicy, UpdatePolicy};
use crate::livecheck::Session;
use crate::projection::registry::ReplicationMetrics;

/// Label set of one `replication_status` series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusKey {
    pub id: String,
    pub leader: String,
    pub port: String,
}

impl StatusKey {
    pub fn for_session(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            leader: session.leader.host.clone(),
            port: session.leader.port.to_string(),
        }
    }

    fn label_values(&self) -> [&str; 3] {
        [&self.id, &self.leader, &self.port]
    }
}

/// Label set of one `peer_connection` series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerKey {
    pub id: String,
    pub leader: String,
    pub port: String,
    pub connection_to: String,
    pub connection_path: String,
}

impl PeerKey {
    pub fn for_peer(session: &Session, peer_id: i64) -> Self {
        Self {
            id: session.id.to_string(),
            leader: session.leader.host.clone(),
            port: session.leader.port.to_string(),
            connection_to: peer_id.to_string(),
            connection_path: connection_path(&session.leader.host, session.leader.port, peer_id),
        }
    }

    fn label_values(&self) -> [&str; 5] {
        [
            &self.id,
            &self.leader,
            &self.port,
            &self.connection_to,
            &self.connection_path,
        ]
    }
}

/// Unique grouping label for one edge: `{leader_host}:{leader_port}/{peer_id}`.
pub fn connection_path(leader_host: &str, leader_port: u16, peer_id: i64) -> String {
    format!("{}:{}/{}", leader_host, leader_port, peer_id)
}

fn as_gauge_value(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// What one projection pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub sessions: usize,
    pub peer_edges: usize,
    pub pruned: usize,
}

/// Applies session snapshots to the replication registry.
///
/// Owned by the poll loop; the registry itself is shared.
pub struct Projector {
    metrics: Arc<ReplicationMetrics>,
    update_policy: UpdatePolicy,
    retention: RetentionPolicy,
    last_status: HashSet<StatusKey>,
    last_peers: HashSet<PeerKey>,
}

impl Projector {
    pub fn new(
        metrics: Arc<ReplicationMetrics>,
        update_policy: UpdatePolicy,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            metrics,
            update_policy,
            retention,
            last_status: HashSet::new(),
            last_peers: HashSet::new(),
        }
    }

    pub fn metrics(&self) -> &Arc<ReplicationMetrics> {
        &self.metrics
    }

    /// Apply one snapshot to the registry.
    pub fn project(&mut self, sessions: &[Session]) -> ProjectionSummary {
        let mut seen_status = HashSet::new();
        let mut seen_peers = HashSet::new();
        let mut summary = ProjectionSummary {
            sessions: sessions.len(),
            ..Default::default()
        };

        for session in sessions {
            if let Some(diagnostic) = session.diagnostic() {
                tracing::debug!(
                    session = session.id,
                    leader = %session.leader.host,
                    error = diagnostic,
                    "Session reported an error"
                );
            }

            for (&peer_id, &connected) in &session.connections {
                let key = PeerKey::for_peer(session, peer_id);
                let gauge = self.metrics.peer_connection().with_label_values(&key.label_values());
                self.apply(&gauge, connected);
                summary.peer_edges += 1;
                seen_peers.insert(key);
            }

            let key = StatusKey::for_session(session);
            let gauge = self
                .metrics
                .replication_status()
                .with_label_values(&key.label_values());
            self.apply(&gauge, session.replicable);
            seen_status.insert(key);
        }

        if self.retention == RetentionPolicy::Prune {
            summary.pruned = self.prune(seen_status, seen_peers);
        }

        summary
    }

    fn apply(&self, gauge: &prometheus::Gauge, flag: bool) {
        let value = as_gauge_value(flag);
        match self.update_policy {
            UpdatePolicy::Add => gauge.add(value),
            UpdatePolicy::Set => gauge.set(value),
        }
    }

    /// Drop series seen last pass but not this one, then remember this pass.
    fn prune(&mut self, seen_status: HashSet<StatusKey>, seen_peers: HashSet<PeerKey>) -> usize {
        let mut pruned = 0;

        for stale in self.last_status.difference(&seen_status) {
            if self
                .metrics
                .replication_status()
                .remove_label_values(&stale.label_values())
                .is_ok()
            {
                pruned += 1;
            }
        }
        for stale in self.last_peers.difference(&seen_peers) {
            if self
                .metrics
                .peer_connection()
                .remove_label_values(&stale.label_values())
                .is_ok()
            {
                pruned += 1;
            }
        }

        if pruned > 0 {
            tracing::debug!(pruned, "Removed stale replication series");
        }

        self.last_status = seen_status;
        self.last_peers = seen_peers;
        pruned
    }
}
