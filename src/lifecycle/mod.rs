//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build registry → Spawn poller → Bind scrape server
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Poller exits at next suspension → Server drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: registry first, then poller, then listener
//! - A failed first poll never blocks startup; scrapes just see an empty registry

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
