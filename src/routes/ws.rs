//! WebSocket handler — the session/event router.
//!
//! DESIGN
//! ======
//! On upgrade, generates the connection's user ID and enters a `select!`
//! loop:
//! - Incoming client events → parse + dispatch by event name
//! - Broadcast events from room peers → forward to client
//!
//! Dispatch validates shape, locates the room, and hands off to the room,
//! drawing, or game service. Services own fan-out: they write into each
//! member's channel while holding the room map's write guard, so all
//! broadcasts caused by one handler are queued before the next handler
//! runs. Only events addressed to the originator (`room-created`,
//! `room-joined`, `error`) come back through the dispatch return value.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → connection gets a fresh user ID
//! 2. Client sends events → dispatch → services mutate + broadcast
//! 3. Close → leave current room (ends the round if the drawer left,
//!    destroys the room if it emptied)

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::{ErrorCode, Event};
use crate::services::{drawing, game, rooms};
use crate::state::{AppState, DrawingData, DRAW_TIME_DEFAULT, ROUNDS_DEFAULT};

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let user_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast events from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Event>(256);

    info!(%user_id, "ws: client connected");

    // Which room this connection has joined, if any.
    let mut current_room: Option<Uuid> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies =
                            dispatch_text(&state, &mut current_room, user_id, &client_tx, &text).await;
                        for event in replies {
                            // A dead socket surfaces as a recv error next
                            // iteration; cleanup happens below either way.
                            let _ = send_event(&mut socket, &event).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(room_id) = current_room {
        rooms::leave_room(&state, room_id, user_id).await;
    }
    info!(%user_id, "ws: client disconnected");
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Parse and process one inbound text event. Returns events addressed to
/// the sender; everything else fans out through the services.
///
/// Separated from the socket loop so tests can drive dispatch end-to-end
/// through registered peer channels.
pub(crate) async fn dispatch_text(
    state: &AppState,
    current_room: &mut Option<Uuid>,
    user_id: Uuid,
    client_tx: &mpsc::Sender<Event>,
    text: &str,
) -> Vec<Event> {
    let req: Event = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%user_id, error = %e, "ws: invalid inbound event");
            return Vec::new();
        }
    };

    match req.name.as_str() {
        "create-room" => handle_create_room(state, current_room, user_id, client_tx, &req).await,
        "join-room" => handle_join_room(state, current_room, user_id, client_tx, &req).await,
        "drawing" => {
            handle_drawing(state, user_id, &req).await;
            Vec::new()
        }
        "clear-canvas" => {
            handle_clear_canvas(state, user_id, &req).await;
            Vec::new()
        }
        "chat-message" => {
            if let (Some(room_id), Some(message)) = (req.uuid_field("roomId"), req.str_field("message")) {
                game::chat(state, room_id, user_id, message).await;
            }
            Vec::new()
        }
        "start-game" => {
            handle_start_game(state, user_id, &req).await;
            Vec::new()
        }
        "select-word" => {
            if let (Some(room_id), Some(word)) = (req.uuid_field("roomId"), req.str_field("word")) {
                game::select_word(state, room_id, user_id, word).await;
            }
            Vec::new()
        }
        "request-hint" => {
            if let Some(room_id) = req.uuid_field("roomId") {
                game::request_hint(state, room_id, user_id).await;
            }
            Vec::new()
        }
        "end-round" => {
            if let Some(room_id) = req.uuid_field("roomId") {
                game::end_round(state, room_id, user_id).await;
            }
            Vec::new()
        }
        other => {
            warn!(%user_id, event = other, "ws: unknown event dropped");
            Vec::new()
        }
    }
}

// =============================================================================
// ROOM HANDLERS
// =============================================================================

async fn handle_create_room(
    state: &AppState,
    current_room: &mut Option<Uuid>,
    user_id: Uuid,
    client_tx: &mpsc::Sender<Event>,
    req: &Event,
) -> Vec<Event> {
    let room_name = req.str_field("roomName").map(str::trim).unwrap_or_default();
    let username = req.str_field("username").map(str::trim).unwrap_or_default();
    if room_name.is_empty() || username.is_empty() {
        return vec![Event::error("Room name and username are required")];
    }

    // A connection lives in at most one room; leave the old one first.
    if let Some(old_room) = current_room.take() {
        rooms::leave_room(state, old_room, user_id).await;
    }

    let (room_id, reply) = rooms::create_room(state, user_id, client_tx.clone(), room_name, username).await;
    *current_room = Some(room_id);
    vec![reply]
}

async fn handle_join_room(
    state: &AppState,
    current_room: &mut Option<Uuid>,
    user_id: Uuid,
    client_tx: &mpsc::Sender<Event>,
    req: &Event,
) -> Vec<Event> {
    let username = req.str_field("username").map(str::trim).unwrap_or_default();
    let room_id_raw = req.str_field("roomId").unwrap_or_default();
    if room_id_raw.is_empty() || username.is_empty() {
        return vec![Event::error("Room ID and username are required")];
    }
    // A malformed id can't name any existing room.
    let Ok(room_id) = room_id_raw.parse::<Uuid>() else {
        return vec![Event::error("Room not found")];
    };

    if let Some(old_room) = *current_room {
        if old_room != room_id {
            rooms::leave_room(state, old_room, user_id).await;
            *current_room = None;
        }
    }

    match rooms::join_room(state, room_id, user_id, client_tx.clone(), username).await {
        Ok(reply) => {
            *current_room = Some(room_id);
            vec![reply]
        }
        Err(e) => {
            warn!(%user_id, %room_id, code = e.error_code(), "ws: join failed");
            vec![Event::error("Room not found")]
        }
    }
}

// =============================================================================
// DRAWING HANDLERS
// =============================================================================

async fn handle_drawing(state: &AppState, user_id: Uuid, req: &Event) {
    let Some(room_id) = req.uuid_field("roomId") else {
        return;
    };
    let Some(raw) = req.data.get("drawingData").cloned() else {
        return;
    };
    let Ok(data) = serde_json::from_value::<DrawingData>(raw.clone()) else {
        return;
    };

    let mut rooms_map = state.rooms.write().await;
    let Some(room) = rooms_map.get_mut(&room_id) else {
        return;
    };
    if room.user(user_id).is_none() {
        return;
    }
    // During an active round only the drawer may draw; the gate lives in
    // the drawing service.
    if drawing::append(room, user_id, data).is_none() {
        return;
    }

    // Not echoed to the sender: their canvas already has the stroke.
    let event = Event::named("drawing")
        .with_data("drawingData", raw)
        .with_data("userId", user_id.to_string());
    rooms::broadcast(room, &event, Some(user_id));
}

async fn handle_clear_canvas(state: &AppState, user_id: Uuid, req: &Event) {
    let Some(room_id) = req.uuid_field("roomId") else {
        return;
    };
    let mut rooms_map = state.rooms.write().await;
    let Some(room) = rooms_map.get_mut(&room_id) else {
        return;
    };
    if room.user(user_id).is_none() {
        return;
    }
    drawing::clear(room);
    rooms::broadcast(room, &Event::named("canvas-cleared"), None);
}

// =============================================================================
// GAME HANDLERS
// =============================================================================

async fn handle_start_game(state: &AppState, user_id: Uuid, req: &Event) {
    let Some(room_id) = req.uuid_field("roomId") else {
        return;
    };
    let settings = req.data.get("settings");
    let rounds = settings
        .and_then(|s| s.get("rounds"))
        .and_then(serde_json::Value::as_u64)
        .map_or(ROUNDS_DEFAULT, |v| u32::try_from(v).unwrap_or(u32::MAX));
    let draw_time = settings
        .and_then(|s| s.get("drawTime"))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(DRAW_TIME_DEFAULT);
    game::start_game(state, room_id, user_id, rounds, draw_time).await;
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
