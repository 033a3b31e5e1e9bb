//! Control endpoints: health, registration, route listing, holding page.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

use crate::admin::escape::query_unescape;
use crate::http::server::AppState;
use crate::observability::metrics;

/// First value of `name` in a raw query string.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Liveness check.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `?id=<key>&target=<escaped url>`: create or overwrite a route.
pub async fn register(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let id = query_param(query.as_deref(), "id").unwrap_or_default();
    let target = query_param(query.as_deref(), "target").unwrap_or_default();

    if id.is_empty() || target.is_empty() {
        tracing::warn!(id = %id, target = %target, "Rejected registration: missing id or target");
        metrics::record_registration(false);
        return (StatusCode::BAD_REQUEST, "invalid request: id and target are required").into_response();
    }

    let target = match query_unescape(&target) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!(id = %id, target = %target, error = %e, "Rejected registration: bad target escape");
            metrics::record_registration(false);
            return (StatusCode::BAD_REQUEST, format!("failed to unescape {target}: {e}")).into_response();
        }
    };

    state.engine.table().register(id.clone(), target.clone());
    metrics::record_registration(true);
    tracing::info!(id = %id, target = %target, "Added route");

    StatusCode::OK.into_response()
}

/// Plaintext listing of the route table, one `key -> target` per line.
pub async fn list_routes(State(state): State<AppState>) -> String {
    let mut entries = state.engine.table().list();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    entries
        .iter()
        .map(|entry| format!("{} -> {}\n", entry.key, entry.target))
        .collect()
}

/// Holding response for requests whose route is missing or not reachable.
pub async fn hold(RawQuery(query): RawQuery) -> (StatusCode, String) {
    let id = query_param(query.as_deref(), "id").unwrap_or_default();
    tracing::info!(id = %id, "Not ready");

    (
        StatusCode::ACCEPTED,
        format!("Not ready: {id}\nThis is a holding page; the route for {id} has no reachable backend yet.\n"),
    )
}
