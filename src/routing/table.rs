//! Runtime route table.
//!
//! # Responsibilities
//! - Map route keys to backend target URLs
//! - Accept registrations while requests are being routed
//! - Provide a snapshot for diagnostics
//!
//! # Design Decisions
//! - `DashMap` shards the map, so writes to distinct keys rarely contend
//! - Targets are stored verbatim; parsing happens per routing decision
//! - Entries are never removed for the lifetime of the process

use dashmap::DashMap;

use crate::observability::metrics;

/// A registered route: key → backend target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub key: String,
    pub target: String,
}

/// Thread-safe mapping from route key to backend target.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: DashMap<String, String>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Insert or overwrite the target for `key`. Last registration wins.
    pub fn register(&self, key: impl Into<String>, target: impl Into<String>) {
        let key = key.into();
        let target = target.into();
        if let Some(previous) = self.routes.insert(key.clone(), target.clone()) {
            tracing::debug!(key = %key, previous = %previous, target = %target, "Route overwritten");
        }
        metrics::record_route_count(self.routes.len());
    }

    /// Current target for `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.routes.get(key).map(|entry| entry.value().clone())
    }

    /// Snapshot of all entries. Order is unspecified.
    pub fn list(&self) -> Vec<RouteEntry> {
        self.routes
            .iter()
            .map(|entry| RouteEntry {
                key: entry.key().clone(),
                target: entry.value().clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
