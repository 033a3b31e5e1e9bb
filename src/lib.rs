//! Dynamic first-segment reverse proxy.
//!
//! Requests are routed by the first segment of their path to a backend
//! registered at runtime through `/register`. Backends that are missing or
//! not accepting connections divert the client to a holding endpoint.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, RoutingEngine};
