//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Resolve config → Init logging/metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: config and bind errors are fatal at startup
//! - Shutdown is a watch channel so tests can stop servers without signals

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
