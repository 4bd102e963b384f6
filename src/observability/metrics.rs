//! Self-telemetry of the exporter.
//!
//! # Responsibilities
//! - Count polls by outcome
//! - Time each poll
//! - Report how many sessions the last successful poll returned
//!
//! # Metrics
//! - `livecheck_exporter_polls_total` (counter): polls by outcome
//! - `livecheck_exporter_poll_duration_seconds` (histogram): fetch + project time
//! - `livecheck_exporter_sessions_observed` (gauge): sessions in the last good snapshot
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op until a recorder is installed
//! - Rendered after the replication families on the same scrape endpoint

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const POLLS_TOTAL: &str = "livecheck_exporter_polls_total";
pub const POLL_DURATION_SECONDS: &str = "livecheck_exporter_poll_duration_seconds";
pub const SESSIONS_OBSERVED: &str = "livecheck_exporter_sessions_observed";

/// Install the global recorder and return the handle used to render it.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(POLLS_TOTAL, "Livecheck polls by outcome");
    describe_histogram!(POLL_DURATION_SECONDS, "Duration of one livecheck poll");
    describe_gauge!(SESSIONS_OBSERVED, "Sessions reported by the last successful poll");
}

/// Record the outcome and duration of one poll iteration.
pub fn record_poll(outcome: &'static str, started: Instant) {
    counter!(POLLS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(POLL_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}

/// Record the size of the last successful snapshot.
pub fn record_sessions_observed(count: usize) {
    gauge!(SESSIONS_OBSERVED).set(count as f64);
}
