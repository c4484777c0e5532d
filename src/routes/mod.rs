//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router binds the WebSocket event surface and the read-only
//! REST introspection endpoints. Cross-origin access is limited to the
//! configured origin, or open when none is configured.

pub mod rooms;
pub mod ws;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState, allowed_origin: Option<&str>) -> Router {
    let cors = match allowed_origin.and_then(parse_origin) {
        Some(origin) => CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any),
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/api/rooms", get(rooms::list_rooms))
        .route("/api/rooms/{id}", get(rooms::get_room))
        .route("/api/rooms/{id}/exists", get(rooms::room_exists))
        .route("/health", get(rooms::health))
        .layer(cors)
        .with_state(state)
}

fn parse_origin(origin: &str) -> Option<HeaderValue> {
    match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(origin, error = %e, "invalid ALLOWED_ORIGIN, allowing any");
            None
        }
    }
}
