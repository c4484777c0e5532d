//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds a map of live rooms. Each room owns its member list, connected
//! client channels, stroke log, game state, and pending timers — a
//! shared-nothing island. Every mutation or broadcast derived from an
//! inbound event or a timer callback runs under the map's write guard, so
//! no two operations on the same room ever interleave.
//!
//! LIFECYCLE
//! =========
//! Rooms are created by `create-room`, mutated by joins/leaves/draws/game
//! events, and destroyed together with their stroke log, game, and pending
//! timers when the last member disconnects. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::event::{now_ms, Event};
use crate::timers::RoomTimers;

// =============================================================================
// USERS
// =============================================================================

/// Fixed 12-entry palette for member colors. Drawn with replacement:
/// collisions are permitted, the color is UI flavor, not identity.
pub const USER_PALETTE: [&str; 12] = [
    "#E53935", "#D81B60", "#8E24AA", "#5E35B1", "#3949AB", "#1E88E5",
    "#00897B", "#43A047", "#F4511E", "#6D4C41", "#FDD835", "#FB8C00",
];

/// A member of a room, bound 1:1 to a live WebSocket connection.
/// Not persisted across reconnects; a dropped socket loses the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub color: String,
}

impl User {
    /// Create a user with a color chosen uniformly from the palette.
    pub fn with_random_color(id: Uuid, username: &str) -> Self {
        use rand::seq::SliceRandom;
        let color = USER_PALETTE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("#000000");
        Self { id, username: username.to_owned(), color: color.to_owned() }
    }
}

// =============================================================================
// STROKES
// =============================================================================

/// A single point on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
}

/// Client-supplied stroke payload, relayed verbatim to peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingData {
    /// `"draw"` or `"erase"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub points: Vec<StrokePoint>,
    pub color: String,
    pub line_width: f64,
}

/// A stroke as stored in the room's log, in arrival order. Replayed to
/// late joiners in the `room-joined` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeEvent {
    #[serde(flatten)]
    pub data: DrawingData,
    pub user_id: Uuid,
    pub timestamp: i64,
}

// =============================================================================
// GAME
// =============================================================================

pub const ROUNDS_MIN: u32 = 1;
pub const ROUNDS_MAX: u32 = 10;
pub const ROUNDS_DEFAULT: u32 = 3;
pub const DRAW_TIME_MIN: u64 = 30;
pub const DRAW_TIME_MAX: u64 = 180;
pub const DRAW_TIME_DEFAULT: u64 = 60;

/// Per-game configuration, validated on `start-game`.
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub total_rounds: u32,
    pub draw_time_secs: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self { total_rounds: ROUNDS_DEFAULT, draw_time_secs: DRAW_TIME_DEFAULT }
    }
}

impl GameSettings {
    /// Accept only in-range settings; out-of-range values reject the whole
    /// request rather than clamping.
    #[must_use]
    pub fn validated(rounds: u32, draw_time_secs: u64) -> Option<Self> {
        if !(ROUNDS_MIN..=ROUNDS_MAX).contains(&rounds) {
            return None;
        }
        if !(DRAW_TIME_MIN..=DRAW_TIME_MAX).contains(&draw_time_secs) {
            return None;
        }
        Some(Self { total_rounds: rounds, draw_time_secs })
    }
}

/// A scoring participant. Insertion order drives drawer rotation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub score: i64,
    pub has_guessed: bool,
}

/// Per-room game state machine data. Transitions live in
/// `services::game`; this struct only answers questions about itself.
#[derive(Debug)]
pub struct Game {
    pub settings: GameSettings,
    pub is_active: bool,
    pub is_round_active: bool,
    /// 0 before play, 1-based during a game.
    pub current_round: u32,
    pub current_drawer: Option<Uuid>,
    pub current_word: Option<String>,
    pub word_options: Vec<String>,
    /// Accumulated across the game; a selected word is never re-offered.
    pub used_words: Vec<String>,
    pub round_started_at: Option<Instant>,
    /// Insertion order. Drawer for round r is `players[(r - 1) % len]`.
    pub players: Vec<Player>,
    /// Ids that guessed correctly this round, in guess order.
    pub guessed: Vec<Uuid>,
    /// Generation counter. Bumped on every transition that supersedes
    /// outstanding timers; a timer whose captured epoch no longer matches
    /// must no-op.
    pub epoch: u64,
}

impl Game {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: GameSettings::default(),
            is_active: false,
            is_round_active: false,
            current_round: 0,
            current_drawer: None,
            current_word: None,
            word_options: Vec::new(),
            used_words: Vec::new(),
            round_started_at: None,
            players: Vec::new(),
            guessed: Vec::new(),
            epoch: 0,
        }
    }

    /// Add a player unless the id is already present.
    pub fn add_player(&mut self, id: Uuid, username: &str) {
        if self.players.iter().any(|p| p.id == id) {
            return;
        }
        self.players
            .push(Player { id, username: username.to_owned(), score: 0, has_guessed: false });
    }

    /// Remove a player and any per-round trace of them.
    pub fn remove_player(&mut self, id: Uuid) {
        self.players.retain(|p| p.id != id);
        self.guessed.retain(|g| *g != id);
    }

    #[must_use]
    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn is_drawer(&self, id: Uuid) -> bool {
        self.current_drawer == Some(id)
    }

    /// Whether every non-drawer has guessed correctly this round.
    #[must_use]
    pub fn all_guessers_done(&self) -> bool {
        self.players
            .iter()
            .filter(|p| Some(p.id) != self.current_drawer)
            .all(|p| p.has_guessed)
    }

    /// Seconds elapsed since the word was selected, zero before selection.
    #[must_use]
    pub fn round_elapsed_secs(&self) -> u64 {
        self.round_started_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Players sorted by score descending, stable within equal scores.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut players = self.players.clone();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ROOM
// =============================================================================

/// Per-room live state. Destroyed as a unit when the last member leaves.
pub struct Room {
    pub name: String,
    /// Milliseconds since Unix epoch, for REST introspection.
    pub created_at: i64,
    /// Members in insertion order. Ids are unique within a room.
    pub users: Vec<User>,
    /// Connected clients: user id -> sender for outgoing events.
    pub clients: HashMap<Uuid, mpsc::Sender<Event>>,
    /// Append-only stroke log, cleared on `clear-canvas` and round starts.
    pub strokes: Vec<StrokeEvent>,
    pub game: Game,
    pub timers: RoomTimers,
}

impl Room {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            created_at: now_ms(),
            users: Vec::new(),
            clients: HashMap::new(),
            strokes: Vec::new(),
            game: Game::new(),
            timers: RoomTimers::new(),
        }
    }

    #[must_use]
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State
/// extractor. Clone is required by Axum — the room map is Arc-wrapped.
#[derive(Clone, Default)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<Uuid, Room>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Create a test `AppState` with no rooms.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new()
    }

    /// Seed an empty room and return its ID.
    pub async fn seed_room(state: &AppState) -> Uuid {
        let room_id = Uuid::new_v4();
        let mut rooms = state.rooms.write().await;
        rooms.insert(room_id, Room::new("Test Room"));
        room_id
    }

    /// Register a member with a live channel in a seeded room. Returns the
    /// user id and the receiving half of their event channel.
    pub async fn register_member(
        state: &AppState,
        room_id: Uuid,
        username: &str,
    ) -> (Uuid, mpsc::Receiver<Event>) {
        let user_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(64);
        let mut rooms = state.rooms.write().await;
        let room = rooms.get_mut(&room_id).expect("room should be seeded");
        room.users.push(User::with_random_color(user_id, username));
        room.clients.insert(user_id, tx);
        room.game.add_player(user_id, username);
        (user_id, rx)
    }

    /// Create a dummy stroke for testing.
    #[must_use]
    pub fn dummy_stroke(user_id: Uuid) -> StrokeEvent {
        StrokeEvent {
            data: DrawingData {
                kind: "draw".into(),
                points: vec![StrokePoint { x: 0.0, y: 0.0 }, StrokePoint { x: 10.0, y: 10.0 }],
                color: "#000000".into(),
                line_width: 2.0,
            },
            user_id,
            timestamp: now_ms(),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
