//! Control plane: endpoints served by the proxy itself.
//!
//! | Path | Response |
//! |---|---|
//! | `/health` | `200`, empty |
//! | `/register?id=&target=` | `200`, or `400` on missing/unescapable input |
//! | `/routes` | `200`, `key -> target` per line |
//! | holding path (`/wait?id=`) | `202`, body naming `id` |
//!
//! Every endpoint accepts any method. Registration is unauthenticated.

pub mod escape;
pub mod handlers;

use axum::{routing::any, Router};

use crate::http::server::AppState;
use self::handlers::*;

/// Router with the control endpoints; the holding endpoint lives at `holding_path`.
pub fn control_router(holding_path: &str) -> Router<AppState> {
    Router::new()
        .route("/health", any(health))
        .route("/register", any(register))
        .route("/routes", any(list_routes))
        .route(holding_path, any(hold))
}
