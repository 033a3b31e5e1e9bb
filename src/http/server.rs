//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with control endpoints and the proxy fallback
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown
//! - Dispatch every other request to the routing engine and forward it

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{uri::InvalidUri, Request},
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{client::legacy::connect::HttpConnector, client::legacy::Client, rt::TokioExecutor};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::control_router;
use crate::config::ProxyConfig;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::http::response::{forward, ProxyClient};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{RouteTable, RoutingEngine};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutingEngine>,
    pub client: ProxyClient,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    config: ProxyConfig,
    table: Arc<RouteTable>,
}

impl HttpServer {
    /// Create a new HTTP server with an empty route table.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_table(config, Arc::new(RouteTable::new()))
    }

    /// Create a server sharing an existing route table.
    pub fn with_table(config: ProxyConfig, table: Arc<RouteTable>) -> Self {
        Self { config, table }
    }

    /// Handle to the route table.
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Build the application router for a proxy listening on `port`.
    ///
    /// Fails if the configured holding host and path do not form a URI.
    pub fn router(&self, port: u16) -> Result<Router, InvalidUri> {
        let engine = RoutingEngine::from_config(self.table.clone(), &self.config.routing, port)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState {
            engine: Arc::new(engine),
            client,
        };
        Ok(Self::build_router(&self.config, state))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        control_router(&config.routing.holding_path)
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// The holding target uses the listener's bound port.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Starting reverse proxy");

        let app = self
            .router(addr.port())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routes a request by its first path segment and forwards it, either to
/// the registered backend or to the holding endpoint.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        host = ?request.headers().get("host"),
        headers = ?request.headers(),
        "Proxying request"
    );

    let decision = state.engine.decide(request.uri()).await;
    let outcome = decision.outcome();
    metrics::record_decision(outcome);

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        key = %decision.key(),
        outcome = outcome,
        upstream = %decision.uri(),
        "Routing decision"
    );

    let response = match forward(&state.client, request, decision.uri().clone()).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %decision.uri(), error = %e, "Upstream error");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start);
    response
}
