//! Livecheck payload types and error definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Address of a session's leader at poll time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Leader {
    pub host: String,
    pub port: u16,
}

/// One replication session as reported by the livecheck endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier, unique within one snapshot.
    pub id: i64,

    pub leader: Leader,

    /// Connectivity to each peer, keyed by peer id. Missing and `null` are both empty.
    #[serde(rename = "isConnected", default, deserialize_with = "null_as_empty")]
    pub connections: BTreeMap<i64, bool>,

    /// Whether the session can currently replicate.
    #[serde(rename = "ableToReplicate")]
    pub replicable: bool,

    /// Diagnostic message, never exported as a metric.
    #[serde(default)]
    pub error: Option<String>,
}

impl Session {
    /// The diagnostic message, if upstream sent a non-empty one.
    pub fn diagnostic(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<i64, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BTreeMap<i64, bool>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a livecheck response body. A `null` body means no sessions.
pub fn decode_sessions(body: &[u8]) -> Result<Vec<Session>, serde_json::Error> {
    let sessions: Option<Vec<Session>> = serde_json::from_slice(body)?;
    Ok(sessions.unwrap_or_default())
}

/// Errors that can occur while fetching the livecheck snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be built, sent, or its body read.
    #[error("transport error requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("could not fetch status from {url}: {status}")]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Body did not match the expected session shape.
    #[error("invalid livecheck payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Short label used for the poll outcome metric.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport_error",
            FetchError::UpstreamStatus { .. } => "upstream_status_error",
            FetchError::Decode { .. } => "decode_error",
        }
    }
}

/// Result type for livecheck operations.
pub type FetchResult<T> = Result<T, FetchError>;
