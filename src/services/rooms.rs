//! Room service — create/join/leave, fan-out, and disconnect reclamation.
//!
//! DESIGN
//! ======
//! Rooms live only in memory. A room is created with its first member and
//! destroyed — stroke log, game, and pending timers together — when the
//! last member disconnects. Fan-out is non-blocking: a member whose
//! channel is full misses that event rather than stalling the room.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::event::Event;
use crate::services::game;
use crate::state::{AppState, Room, User};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room not found: {0}")]
    NotFound(Uuid),
}

impl crate::event::ErrorCode for RoomError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ROOM_NOT_FOUND",
        }
    }
}

/// Room listing entry for REST introspection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: Uuid,
    pub name: String,
    pub user_count: usize,
    pub created_at: i64,
}

/// Full room view for REST introspection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    pub id: Uuid,
    pub name: String,
    pub user_count: usize,
    pub created_at: i64,
    pub users: Vec<User>,
    pub game_active: bool,
}

// =============================================================================
// FAN-OUT
// =============================================================================

/// Send one event to one member. Best-effort: a full channel drops it.
pub fn send_to(room: &Room, user_id: Uuid, event: Event) {
    if let Some(tx) = room.clients.get(&user_id) {
        let _ = tx.try_send(event);
    }
}

/// Broadcast an event to all members of a room, optionally excluding one.
/// Best-effort: if a member's channel is full, skip them.
pub fn broadcast(room: &Room, event: &Event, exclude: Option<Uuid>) {
    for (user_id, tx) in &room.clients {
        if exclude == Some(*user_id) {
            continue;
        }
        let _ = tx.try_send(event.clone());
    }
}

// =============================================================================
// CREATE / JOIN
// =============================================================================

/// Create a room with the caller as its first member and game player.
/// Returns the new room id and the `room-created` reply for the caller.
pub async fn create_room(
    state: &AppState,
    user_id: Uuid,
    tx: mpsc::Sender<Event>,
    room_name: &str,
    username: &str,
) -> (Uuid, Event) {
    let room_id = Uuid::new_v4();
    let mut room = Room::new(room_name);
    let user = User::with_random_color(user_id, username);
    room.users.push(user.clone());
    room.clients.insert(user_id, tx);
    room.game.add_player(user_id, username);

    state.rooms.write().await.insert(room_id, room);
    info!(%room_id, %user_id, name = room_name, "room created");

    let reply = Event::named("room-created")
        .with_data("roomId", room_id.to_string())
        .with_data("roomName", room_name)
        .with_serialized("user", &user);
    (room_id, reply)
}

/// Join an existing room. Idempotent for a connection already present:
/// the member is not duplicated and peers see no second `user-joined`.
/// Returns the `room-joined` reply carrying the member list, the stroke
/// log for replay, and the current game snapshot.
///
/// # Errors
///
/// Returns [`RoomError::NotFound`] when the room does not exist.
pub async fn join_room(
    state: &AppState,
    room_id: Uuid,
    user_id: Uuid,
    tx: mpsc::Sender<Event>,
    username: &str,
) -> Result<Event, RoomError> {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return Err(RoomError::NotFound(room_id));
    };

    let (user, newly_added) = match room.user(user_id).cloned() {
        Some(existing) => (existing, false),
        None => {
            let user = User::with_random_color(user_id, username);
            room.users.push(user.clone());
            (user, true)
        }
    };
    room.clients.insert(user_id, tx);
    room.game.add_player(user_id, username);

    let reply = Event::named("room-joined")
        .with_data("roomId", room_id.to_string())
        .with_data("roomName", room.name.clone())
        .with_serialized("user", &user)
        .with_serialized("users", &room.users)
        .with_serialized("drawingData", &room.strokes)
        .with_data("gameState", game::snapshot(&room.game));

    if newly_added {
        let joined = Event::named("user-joined").with_serialized("user", &user);
        broadcast(room, &joined, Some(user_id));
        info!(%room_id, %user_id, members = room.users.len(), "client joined room");
    }

    Ok(reply)
}

// =============================================================================
// LEAVE / DISCONNECT
// =============================================================================

/// Remove a member from a room, on explicit leave or transport disconnect.
/// Peers see `user-left`; if the member was the current drawer mid-round
/// the round ends immediately; an emptied room is destroyed together with
/// its stroke log, game, and pending timers.
pub async fn leave_room(state: &AppState, room_id: Uuid, user_id: Uuid) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };
    let Some(pos) = room.users.iter().position(|u| u.id == user_id) else {
        room.clients.remove(&user_id);
        return;
    };

    let user = room.users.remove(pos);
    room.clients.remove(&user_id);
    let was_drawer = room.game.is_drawer(user_id);
    room.game.remove_player(user_id);

    let left = Event::named("user-left").with_serialized("user", &user);
    broadcast(room, &left, None);
    info!(%room_id, %user_id, remaining = room.users.len(), "client left room");

    if room.users.is_empty() {
        // RoomTimers aborts its pending handles on drop.
        rooms.remove(&room_id);
        info!(%room_id, "evicted empty room");
    } else if was_drawer {
        game::abort_round_for_drawer_loss(state, room_id, room);
    }
}

// =============================================================================
// INTROSPECTION
// =============================================================================

/// List all live rooms.
pub async fn list_rooms(state: &AppState) -> Vec<RoomSummary> {
    let rooms = state.rooms.read().await;
    rooms
        .iter()
        .map(|(id, room)| RoomSummary {
            id: *id,
            name: room.name.clone(),
            user_count: room.users.len(),
            created_at: room.created_at,
        })
        .collect()
}

/// Full view of one room, if it exists.
pub async fn room_detail(state: &AppState, room_id: Uuid) -> Option<RoomDetail> {
    let rooms = state.rooms.read().await;
    rooms.get(&room_id).map(|room| RoomDetail {
        id: room_id,
        name: room.name.clone(),
        user_count: room.users.len(),
        created_at: room.created_at,
        users: room.users.clone(),
        game_active: room.game.is_active,
    })
}

pub async fn room_exists(state: &AppState, room_id: Uuid) -> bool {
    state.rooms.read().await.contains_key(&room_id)
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
