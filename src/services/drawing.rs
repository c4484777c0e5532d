//! Drawing service — the per-room stroke log.
//!
//! Strokes accumulate in arrival order and are replayed to late joiners
//! via the `room-joined` payload. The log is cleared on `clear-canvas`,
//! on game start, and at the start of every round.

use uuid::Uuid;

use crate::event::now_ms;
use crate::state::{DrawingData, Room, StrokeEvent};

/// Append a stroke to the room's log. During an active round only the
/// current drawer may draw; anyone else's strokes are dropped.
pub fn append(room: &mut Room, user_id: Uuid, data: DrawingData) -> Option<&StrokeEvent> {
    if room.game.is_round_active && !room.game.is_drawer(user_id) {
        return None;
    }
    room.strokes
        .push(StrokeEvent { data, user_id, timestamp: now_ms() });
    room.strokes.last()
}

/// Drop every stroke in the room's log.
pub fn clear(room: &mut Room) {
    room.strokes.clear();
}

#[cfg(test)]
#[path = "drawing_test.rs"]
mod tests;
