//! The polling worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time;

use crate::config::PollerConfig;
use crate::livecheck::{FetchError, SessionSource};
use crate::observability::metrics;
use crate::projection::{ProjectionSummary, Projector, ReplicationMetrics};

/// Drives a session source and a projector on a fixed schedule.
pub struct Poller<S> {
    source: S,
    projector: Projector,
    interval: Duration,
}

impl<S: SessionSource> Poller<S> {
    pub fn new(source: S, projector: Projector, interval: Duration) -> Self {
        Self {
            source,
            projector,
            interval,
        }
    }

    /// Build a poller writing to `metrics` with the configured policies.
    pub fn from_config(source: S, metrics: Arc<ReplicationMetrics>, config: &PollerConfig) -> Self {
        let projector = Projector::new(metrics, config.update_policy, config.retention);
        Self::new(source, projector, Duration::from_millis(config.interval_ms))
    }

    /// Run exactly one fetch-then-project iteration.
    ///
    /// A fetch error is logged and returned; the registry is only touched on
    /// success.
    pub async fn poll_once(&mut self) -> Result<ProjectionSummary, FetchError> {
        let started = Instant::now();

        match self.source.fetch().await {
            Ok(sessions) => {
                let summary = self.projector.project(&sessions);
                metrics::record_poll("success", started);
                metrics::record_sessions_observed(summary.sessions);
                tracing::debug!(
                    sessions = summary.sessions,
                    peer_edges = summary.peer_edges,
                    pruned = summary.pruned,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Livecheck snapshot projected"
                );
                Ok(summary)
            }
            Err(e) => {
                metrics::record_poll(e.kind(), started);
                tracing::warn!(
                    url = %self.source.describe(),
                    kind = e.kind(),
                    error = %e,
                    "Livecheck poll failed; keeping previous values"
                );
                Err(e)
            }
        }
    }

    /// Poll until shutdown is signalled.
    ///
    /// The first poll happens immediately. Shutdown is observed while idle; an
    /// in-flight poll always completes (it is bounded by the client timeout).
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            source = %self.source.describe(),
            interval_ms = self.interval.as_millis() as u64,
            "Poller starting"
        );

        loop {
            let _ = self.poll_once().await;

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Poller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricsConfig, RetentionPolicy, UpdatePolicy};
    use crate::lifecycle::Shutdown;
    use crate::livecheck::{decode_sessions, FetchResult, Session};
    use crate::projection::Family;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const HEALTHY: &str = r#"[{"id":1,"leader":{"host":"10.0.0.1","port":9000},"isConnected":{"2":true,"3":false},"ableToReplicate":true}]"#;

    /// Replays queued responses, then reports an empty cluster.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        responses: Arc<Mutex<VecDeque<FetchResult<Vec<Session>>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn push(&self, response: FetchResult<Vec<Session>>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SessionSource for ScriptedSource {
        fn fetch(&self) -> impl Future<Output = FetchResult<Vec<Session>>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()));
            async move { next }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn healthy() -> FetchResult<Vec<Session>> {
        Ok(decode_sessions(HEALTHY.as_bytes()).unwrap())
    }

    fn unavailable() -> FetchResult<Vec<Session>> {
        Err(FetchError::UpstreamStatus {
            url: "http://10.0.0.1:9000/_/livecheck".into(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }

    fn garbage() -> FetchResult<Vec<Session>> {
        Err(FetchError::Decode {
            url: "http://10.0.0.1:9000/_/livecheck".into(),
            source: decode_sessions(b"<html>").unwrap_err(),
        })
    }

    /// A real transport failure: nothing listens on the discard port.
    async fn refused() -> FetchResult<Vec<Session>> {
        let url = "http://127.0.0.1:9/_/livecheck";
        let source = reqwest::Client::new().post(url).send().await.unwrap_err();
        Err(FetchError::Transport {
            url: url.into(),
            source,
        })
    }

    fn poller(source: ScriptedSource, config: &PollerConfig) -> (Poller<ScriptedSource>, Arc<ReplicationMetrics>) {
        let metrics = Arc::new(ReplicationMetrics::new(&MetricsConfig::default()).unwrap());
        (Poller::from_config(source, metrics.clone(), config), metrics)
    }

    fn status(metrics: &ReplicationMetrics) -> Option<f64> {
        metrics.sample(
            Family::ReplicationStatus,
            &[("id", "1"), ("leader", "10.0.0.1"), ("port", "9000")],
        )
    }

    #[tokio::test]
    async fn test_failed_polls_leave_registry_unchanged() {
        let source = ScriptedSource::default();
        source.push(healthy());
        source.push(refused().await);
        source.push(unavailable());
        source.push(garbage());
        source.push(healthy());

        let (mut poller, metrics) = poller(source.clone(), &PollerConfig::default());

        assert!(poller.poll_once().await.is_ok());
        let before = metrics.render().unwrap();
        assert_eq!(status(&metrics), Some(1.0));

        let err = poller.poll_once().await.unwrap_err();
        assert_eq!(err.kind(), "transport_error");
        assert_eq!(metrics.render().unwrap(), before);

        let err = poller.poll_once().await.unwrap_err();
        assert_eq!(err.kind(), "upstream_status_error");
        assert_eq!(metrics.render().unwrap(), before);

        let err = poller.poll_once().await.unwrap_err();
        assert_eq!(err.kind(), "decode_error");
        assert_eq!(metrics.render().unwrap(), before);

        // The loop keeps going after failures.
        assert!(poller.poll_once().await.is_ok());
        assert_eq!(status(&metrics), Some(2.0));
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test]
    async fn test_accumulates_over_polls() {
        let source = ScriptedSource::default();
        for _ in 0..3 {
            source.push(healthy());
        }
        let (mut poller, metrics) = poller(source, &PollerConfig::default());

        for _ in 0..3 {
            poller.poll_once().await.unwrap();
        }
        assert_eq!(status(&metrics), Some(3.0));
    }

    #[tokio::test]
    async fn test_failed_poll_does_not_prune() {
        let source = ScriptedSource::default();
        source.push(healthy());
        source.push(unavailable());
        source.push(Ok(Vec::new()));

        let config = PollerConfig {
            update_policy: UpdatePolicy::Set,
            retention: RetentionPolicy::Prune,
            ..Default::default()
        };
        let (mut poller, metrics) = poller(source, &config);

        poller.poll_once().await.unwrap();
        let _ = poller.poll_once().await;
        assert_eq!(metrics.series_count(Family::PeerConnection), 2);

        let summary = poller.poll_once().await.unwrap();
        assert_eq!(summary.pruned, 3);
        assert_eq!(metrics.series_count(Family::PeerConnection), 0);
        assert_eq!(status(&metrics), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval_until_shutdown() {
        let source = ScriptedSource::default();
        source.push(unavailable());
        source.push(healthy());

        let (poller, metrics) = poller(source.clone(), &PollerConfig::default());
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(poller.run(shutdown.subscribe()));

        // Polls at t=0, 2s, 4s and 6s.
        time::sleep(Duration::from_millis(6_100)).await;
        assert_eq!(source.calls(), 4);
        assert_eq!(status(&metrics), Some(1.0));

        shutdown.trigger();
        handle.await.unwrap();
        assert_eq!(source.calls(), 4);
    }

    /// Source whose fetch takes a fixed amount of (paused) time.
    struct SlowSource {
        delay: Duration,
        started_at: Arc<Mutex<Vec<time::Instant>>>,
    }

    impl SessionSource for SlowSource {
        fn fetch(&self) -> impl Future<Output = FetchResult<Vec<Session>>> + Send {
            self.started_at.lock().unwrap().push(time::Instant::now());
            let delay = self.delay;
            async move {
                time::sleep(delay).await;
                Ok(Vec::new())
            }
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_measured_from_end_of_poll() {
        let started_at = Arc::new(Mutex::new(Vec::new()));
        let source = SlowSource {
            delay: Duration::from_millis(1_500),
            started_at: started_at.clone(),
        };
        let metrics = Arc::new(ReplicationMetrics::new(&MetricsConfig::default()).unwrap());
        let poller = Poller::from_config(source, metrics, &PollerConfig::default());

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(poller.run(shutdown.subscribe()));

        time::sleep(Duration::from_millis(7_100)).await;
        shutdown.trigger();
        handle.await.unwrap();

        let starts = started_at.lock().unwrap();
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(3_500));
        }
    }
}
