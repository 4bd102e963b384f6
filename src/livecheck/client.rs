//! Livecheck HTTP client.
//!
//! # Responsibilities
//! - POST to the configured livecheck endpoint with a bounded timeout
//! - Classify failures (transport, status, decode)
//! - Never retry; the poll loop owns the schedule

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::TargetConfig;
use crate::livecheck::types::{decode_sessions, FetchError, FetchResult, Session};

/// Errors building a client from configuration.
#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("invalid target URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Client(#[from] FetchError),
}

/// Anything that can produce a snapshot of replication sessions.
pub trait SessionSource: Send + Sync {
    /// Fetch the current snapshot.
    fn fetch(&self) -> impl Future<Output = FetchResult<Vec<Session>>> + Send;

    /// Human-readable description of where sessions come from, for logs.
    fn describe(&self) -> String;
}

/// Client for a single `repd` livecheck endpoint.
#[derive(Clone)]
pub struct LivecheckClient {
    http: reqwest::Client,
    url: Url,
}

impl LivecheckClient {
    /// Create a client for the given endpoint.
    pub fn new(url: Url, timeout: Duration, user_agent: &str) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(Self { http, url })
    }

    /// Create a client from the target section of the configuration.
    pub fn from_config(config: &TargetConfig) -> Result<Self, ClientConfigError> {
        let url = config.endpoint_url()?;
        let client = Self::new(
            url,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?;
        Ok(client)
    }

    /// The endpoint this client polls.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and decode the session list.
    pub async fn fetch_sessions(&self) -> FetchResult<Vec<Session>> {
        let transport = |source| FetchError::Transport {
            url: self.url.to_string(),
            source,
        };

        let response = self
            .http
            .post(self.url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: self.url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;

        decode_sessions(&body).map_err(|source| FetchError::Decode {
            url: self.url.to_string(),
            source,
        })
    }
}

impl SessionSource for LivecheckClient {
    fn fetch(&self) -> impl Future<Output = FetchResult<Vec<Session>>> + Send {
        self.fetch_sessions()
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
