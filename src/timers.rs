//! Timer service — one-shot delayed game transitions with cancellation.
//!
//! DESIGN
//! ======
//! Every autonomous transition (first round after `game-started`, round
//! end after the draw time, inter-round gap, game end) is a spawned task
//! that sleeps and then re-enters the game service. Two guards keep stale
//! timers from firing into a newer state:
//!
//! 1. The `JoinHandle` is stored on the room and aborted whenever a newer
//!    timer supersedes it or the room is destroyed.
//! 2. The task captures `game.epoch` at schedule time; the dispatch
//!    re-checks it under the state lock and no-ops on mismatch.
//!
//! Abort alone is not enough: a task that already woke and is waiting on
//! the lock survives `abort()`'s best effort, so the epoch check is the
//! authoritative gate.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::services::game;
use crate::state::AppState;

/// Which transition a scheduled timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    StartRound,
    EndRound,
    EndGame,
}

// =============================================================================
// PENDING TIMERS
// =============================================================================

/// Pending one-shot timers for a room. At most one round-end timer and one
/// phase timer are outstanding at a time; replacing a slot aborts the
/// previous occupant. Dropping the set (room destruction) aborts both.
#[derive(Debug, Default)]
pub struct RoomTimers {
    round_end: Option<JoinHandle<()>>,
    next_phase: Option<JoinHandle<()>>,
}

impl RoomTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the round-end timer, aborting any previous one.
    pub fn set_round_end(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.round_end.replace(handle) {
            old.abort();
        }
    }

    /// Store the next-phase timer (round start or game end), aborting any
    /// previous one.
    pub fn set_next_phase(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.next_phase.replace(handle) {
            old.abort();
        }
    }

    pub fn cancel_round_end(&mut self) {
        if let Some(handle) = self.round_end.take() {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_round_end();
        if let Some(handle) = self.next_phase.take() {
            handle.abort();
        }
    }
}

impl Drop for RoomTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// =============================================================================
// SCHEDULING
// =============================================================================

/// Spawn a one-shot timer for a room transition. The caller stores the
/// returned handle on the room so a terminal transition can cancel it.
pub fn schedule(
    state: &AppState,
    room_id: Uuid,
    epoch: u64,
    delay: Duration,
    action: TimerAction,
) -> JoinHandle<()> {
    let state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        fire(&state, room_id, epoch, action).await;
    })
}

/// Run a due timer. Re-acquires the state lock; the game service verifies
/// the room still exists and the epoch still matches before transitioning.
pub async fn fire(state: &AppState, room_id: Uuid, epoch: u64, action: TimerAction) {
    debug!(%room_id, epoch, ?action, "timer fired");
    game::on_timer(state, room_id, epoch, action).await;
}
