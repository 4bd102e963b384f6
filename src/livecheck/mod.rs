//! Upstream livecheck subsystem (the fetcher).
//!
//! # Data Flow
//! ```text
//! Poll loop tick
//!     → client.rs (POST {scheme}://{host}:{port}{path}, 5s timeout)
//!     → types.rs (decode JSON array into Session records)
//!     → Vec<Session> handed to the projector, or FetchError to the loop
//! ```
//!
//! # Design Decisions
//! - One request per call, no retries
//! - A malformed body fails the whole snapshot, never a single session
//! - `SessionSource` lets the poll loop run against scripted sources in tests

pub mod client;
pub mod types;

pub use client::{ClientConfigError, LivecheckClient, SessionSource};
pub use types::{decode_sessions, FetchError, FetchResult, Leader, Session};
