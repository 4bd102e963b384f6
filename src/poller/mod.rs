//! Poll loop subsystem.
//!
//! # Data Flow
//! ```text
//! Idle ──(startup, then interval after previous poll ends)──▶ Polling
//!     Polling: SessionSource::fetch → Projector::project
//! Polling ──(always, success or failure)──▶ Idle
//! ```
//!
//! # Design Decisions
//! - One background task; fetch and project never overlap
//! - The interval is measured from the end of a poll, so a slow upstream
//!   delays the next poll rather than stacking them
//! - A failed poll is logged and leaves the registry untouched
//! - Cooperative shutdown through the lifecycle broadcast channel

pub mod worker;

pub use worker::Poller;
