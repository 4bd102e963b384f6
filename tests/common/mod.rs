//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use livecheck_exporter::config::ExporterConfig;
use livecheck_exporter::projection::{Family, ReplicationMetrics};

/// Body from the documented end-to-end scenario.
pub const HEALTHY_BODY: &str = r#"[{"id":1,"leader":{"host":"10.0.0.1","port":9000},"isConnected":{"2":true,"3":false},"ableToReplicate":true}]"#;

/// Request heads received by a mock upstream, in arrival order.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Start a programmable mock upstream on an ephemeral port.
///
/// Every request head is recorded; the closure decides status and body.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let requests = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        requests.lock().unwrap().push(head);

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Start a mock upstream that always answers with the same status and body.
pub async fn start_fixed_upstream(status: u16, body: &'static str) -> (SocketAddr, RequestLog) {
    start_programmable_upstream(move || async move { (status, body.to_string()) }).await
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Exporter config pointed at `upstream`, serving on an ephemeral port.
pub fn config_for(upstream: SocketAddr) -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.target.host = upstream.ip().to_string();
    config.target.port = upstream.port();
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.observability.self_metrics_enabled = false;
    config
}

pub fn status_labels() -> [(&'static str, &'static str); 3] {
    [("id", "1"), ("leader", "10.0.0.1"), ("port", "9000")]
}

pub fn peer_labels(peer: &'static str) -> Vec<(&'static str, String)> {
    vec![
        ("id", "1".to_string()),
        ("leader", "10.0.0.1".to_string()),
        ("port", "9000".to_string()),
        ("connection_to", peer.to_string()),
        ("connection_path", format!("10.0.0.1:9000/{}", peer)),
    ]
}

/// Value of a series in scraped exposition text.
pub fn scraped(
    exposition: &str,
    metrics: &ReplicationMetrics,
    family: Family,
    labels: &[(&str, String)],
) -> Option<f64> {
    let name = metrics.family_name(family);
    exposition.lines().find_map(|line| {
        let (series, value) = line.rsplit_once(' ')?;
        if series_matches(series, &name, labels) {
            value.parse().ok()
        } else {
            None
        }
    })
}

/// Whether `series` is exactly `name{labels}`, in any label order.
///
/// Label values in these tests never contain quotes or commas.
fn series_matches(series: &str, name: &str, labels: &[(&str, String)]) -> bool {
    let Some(body) = series
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('{'))
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return false;
    };

    let pairs: Vec<&str> = body.split(',').filter(|p| !p.is_empty()).collect();
    pairs.len() == labels.len()
        && labels
            .iter()
            .all(|(k, v)| pairs.contains(&format!("{}=\"{}\"", k, v).as_str()))
}

/// Poll `check` every 20ms until it returns true or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
