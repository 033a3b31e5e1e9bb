//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → prefix.rs (normalize path, take first segment as key)
//!     → table.rs (key → registered target)
//!     → probe.rs (TCP connect within timeout)
//!     → engine.rs: Forward(target URI) or Hold(holding URI)
//!
//! Registration (at runtime):
//!     /register?id=..&target=..
//!     → table.rs (insert or overwrite)
//! ```
//!
//! # Design Decisions
//! - Routes are registered at runtime, never loaded from config
//! - One shared table, passed by `Arc`, no global state
//! - Every request re-probes; nothing is remembered between requests

pub mod engine;
pub mod prefix;
pub mod probe;
pub mod table;

pub use engine::{Decision, HoldReason, HoldingTarget, RoutingEngine};
pub use prefix::extract_prefix;
pub use probe::{Probe, TcpProbe};
pub use table::{RouteEntry, RouteTable};
