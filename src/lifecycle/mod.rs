//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Build registry → Resolve config → Start watcher → Run
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger config reload
//! ```
//!
//! # Design Decisions
//! - A broken schema is fatal at startup; a broken config document is not

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
