//! Read-only REST introspection over live rooms.
//!
//! The WebSocket surface owns every mutation; these endpoints exist so a
//! lobby page can enumerate rooms and validate an invite link before
//! connecting.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::event::now_ms;
use crate::services::rooms::{self, RoomDetail, RoomSummary};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RoomListResponse {
    pub success: bool,
    pub rooms: Vec<RoomSummary>,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub success: bool,
    pub room: RoomDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
}

/// `GET /api/rooms` — list all live rooms.
pub async fn list_rooms(State(state): State<AppState>) -> Json<RoomListResponse> {
    let rooms = rooms::list_rooms(&state).await;
    Json(RoomListResponse { success: true, rooms })
}

/// `GET /api/rooms/{id}` — full view of one room, 404 when absent.
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    match rooms::room_detail(&state, room_id).await {
        Some(room) => Ok(Json(RoomResponse { success: true, room })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { success: false, error: "Room not found".into() }),
        )),
    }
}

/// `GET /api/rooms/{id}/exists` — cheap invite-link validation.
pub async fn room_exists(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Json<ExistsResponse> {
    Json(ExistsResponse { exists: rooms::room_exists(&state, room_id).await })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", timestamp: now_ms() })
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
