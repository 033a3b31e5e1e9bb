//! Per-request routing decision.
//!
//! # Responsibilities
//! - Derive the route key from the inbound path
//! - Look up the registered target and probe it
//! - Produce either the rewritten backend URI or the holding URI
//!
//! # Design Decisions
//! - No state survives between requests; every request re-probes
//! - A missing route, an unparsable target and a dead backend all hold
//! - The hold reason is kept for logs and metrics only

use std::fmt;
use std::sync::Arc;

use axum::http::uri::{InvalidUri, Uri};
use url::{form_urlencoded, Position, Url};

use crate::config::{RewriteMode, RoutingConfig};
use crate::routing::prefix::{decode_path, extract_prefix};
use crate::routing::probe::{Probe, TcpProbe};
use crate::routing::table::RouteTable;

/// Why a request was diverted to the holding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// No route registered for the key.
    NoRoute,
    /// The registered target is not a usable URL.
    InvalidTarget,
    /// The registered target did not accept a connection.
    Unreachable,
}

impl HoldReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldReason::NoRoute => "no_route",
            HoldReason::InvalidTarget => "invalid_target",
            HoldReason::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of routing a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the backend at `uri`.
    Forward { key: String, uri: Uri },
    /// Divert to the holding endpoint at `uri`.
    Hold {
        key: String,
        reason: HoldReason,
        uri: Uri,
    },
}

impl Decision {
    /// The outbound URI the request is rewritten to.
    pub fn uri(&self) -> &Uri {
        match self {
            Decision::Forward { uri, .. } | Decision::Hold { uri, .. } => uri,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Decision::Forward { key, .. } | Decision::Hold { key, .. } => key,
        }
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Forward { .. } => "forward",
            Decision::Hold { reason, .. } => reason.as_str(),
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Decision::Forward { .. })
    }
}

/// The proxy's own holding endpoint.
#[derive(Debug, Clone)]
pub struct HoldingTarget {
    base: Uri,
}

impl HoldingTarget {
    /// Fails when `host` and `path` do not form an absolute `http` URI.
    pub fn new(host: &str, port: u16, path: &str) -> Result<Self, InvalidUri> {
        let base = format!("http://{host}:{port}{path}").parse()?;
        Ok(Self { base })
    }

    /// Holding URI carrying `original_path` as the escaped `id` parameter.
    pub fn uri_for(&self, original_path: &str) -> Uri {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("id", original_path)
            .finish();
        // The serializer only emits query-safe bytes, so appending to a valid
        // base always parses.
        format!("{}?{}", self.base, query).parse().unwrap_or_else(|e| {
            tracing::error!(base = %self.base, error = %e, "Invalid holding query");
            self.base.clone()
        })
    }
}

/// Decides, per request, between forwarding and holding.
#[derive(Debug)]
pub struct RoutingEngine<P = TcpProbe> {
    table: Arc<RouteTable>,
    probe: P,
    holding: HoldingTarget,
    rewrite: RewriteMode,
}

impl RoutingEngine<TcpProbe> {
    /// Build an engine with a TCP probe from routing configuration.
    ///
    /// `port` is the port this proxy actually listens on.
    pub fn from_config(
        table: Arc<RouteTable>,
        config: &RoutingConfig,
        port: u16,
    ) -> Result<Self, InvalidUri> {
        let probe = TcpProbe::new(std::time::Duration::from_millis(config.probe_timeout_ms));
        let holding = HoldingTarget::new(&config.holding_host, port, &config.holding_path)?;
        Ok(Self::new(table, probe, holding, config.rewrite))
    }
}

impl<P: Probe> RoutingEngine<P> {
    pub fn new(table: Arc<RouteTable>, probe: P, holding: HoldingTarget, rewrite: RewriteMode) -> Self {
        Self {
            table,
            probe,
            holding,
            rewrite,
        }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Route an inbound request URI.
    pub async fn decide(&self, inbound: &Uri) -> Decision {
        let path = decode_path(inbound.path());
        let key = extract_prefix(&path);

        let Some(raw_target) = self.table.lookup(&key) else {
            tracing::info!(key = %key, "No route set for prefix");
            return self.hold(key, HoldReason::NoRoute, &path);
        };

        let target = match Url::parse(&raw_target) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(key = %key, target = %raw_target, error = %e, "Registered target is not a valid URL");
                return self.hold(key, HoldReason::InvalidTarget, &path);
            }
        };

        // `Url` normalizes `:80` away, so the probe gets the target as written
        let Ok(probe_target) = raw_target.parse::<Uri>() else {
            tracing::warn!(key = %key, target = %raw_target, "Registered target is not a valid request URI");
            return self.hold(key, HoldReason::InvalidTarget, &path);
        };

        if !self.probe.reachable(&probe_target).await {
            tracing::info!(key = %key, target = %target, "Backend not reachable");
            return self.hold(key, HoldReason::Unreachable, &path);
        }

        match rewrite_uri(&target, inbound, self.rewrite) {
            Some(uri) => {
                tracing::info!(key = %key, target = %uri, "Routing to target");
                Decision::Forward { key, uri }
            }
            None => {
                tracing::warn!(key = %key, target = %target, "Target cannot be used as a request URI");
                self.hold(key, HoldReason::InvalidTarget, &path)
            }
        }
    }

    fn hold(&self, key: String, reason: HoldReason, original_path: &str) -> Decision {
        Decision::Hold {
            key,
            reason,
            uri: self.holding.uri_for(original_path),
        }
    }
}

/// Builds the outbound URI for `target` according to `mode`.
fn rewrite_uri(target: &Url, inbound: &Uri, mode: RewriteMode) -> Option<Uri> {
    let origin = &target[..Position::BeforePath];
    let uri = match mode {
        RewriteMode::Replace => target[..Position::AfterQuery].to_string(),
        RewriteMode::Join => {
            let path = join_paths(target.path(), inbound.path());
            let query = match (target.query(), inbound.query()) {
                (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some(format!("{a}&{b}")),
                (Some(a), _) if !a.is_empty() => Some(a.to_string()),
                (_, Some(b)) if !b.is_empty() => Some(b.to_string()),
                _ => None,
            };
            match query {
                Some(query) => format!("{origin}{path}?{query}"),
                None => format!("{origin}{path}"),
            }
        }
    };
    uri.parse().ok()
}

/// Joins two paths with exactly one slash at the seam.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
