//! Game service — round progression, scoring, hints, and guess
//! adjudication.
//!
//! STATES
//! ======
//! `Idle` (is_active=false) → `WaitingForWord` (a drawer holds word
//! options) → `Drawing` (is_round_active=true) → back to `WaitingForWord`
//! for the next round, or `Idle` when the game ends. All transitions run
//! under the room map's write guard; autonomous ones arrive through
//! [`on_timer`] with an epoch captured at schedule time.
//!
//! DESIGN
//! ======
//! Public async functions validate an inbound event, then call the sync
//! transition helpers that operate on `&mut Room`. Timer callbacks share
//! those helpers, so the scheduled and the manual path cannot diverge.
//! Validation failures on game events are silent drops: the server is
//! authoritative and the client resynchronizes from the next broadcast.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::event::{now_ms, Event};
use crate::services::drawing;
use crate::services::rooms::{broadcast, send_to};
use crate::state::{AppState, Game, GameSettings, Room};
use crate::timers::{self, TimerAction};
use crate::words;

/// Base points by guess order; fourth and later guessers share the tail.
const GUESS_BASE_SCORES: [i64; 4] = [100, 75, 50, 25];
/// Flat award to the drawer per correct guess in their round.
const DRAWER_POINTS_PER_GUESS: i64 = 25;
/// Words offered to the drawer each round.
const WORD_OPTION_COUNT: usize = 3;
/// Characters revealed per hint request.
const HINT_REVEAL_COUNT: usize = 1;

/// Gap between `game-started` and the first round.
const FIRST_ROUND_DELAY: Duration = Duration::from_secs(3);
/// Gap between `round-ended` and the next round.
const INTER_ROUND_DELAY: Duration = Duration::from_secs(5);
/// Gap between the final `round-ended` and `game-ended`.
const GAME_END_DELAY: Duration = Duration::from_secs(5);
/// Grace period after the last guesser succeeds, so their `correct-guess`
/// lands before the reveal.
const ALL_GUESSED_DELAY: Duration = Duration::from_secs(2);

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Client-facing view of a game, embedded in the `room-joined` payload.
/// Never leaks the current word; guessers get the masked rendering.
#[must_use]
pub fn snapshot(game: &Game) -> Value {
    serde_json::json!({
        "isActive": game.is_active,
        "isRoundActive": game.is_round_active,
        "currentRound": game.current_round,
        "totalRounds": game.settings.total_rounds,
        "drawTime": game.settings.draw_time_secs,
        "currentDrawerId": game.current_drawer,
        "players": game.players,
        "guessedPlayers": game.guessed,
        "maskedWord": game
            .current_word
            .as_deref()
            .filter(|_| game.is_round_active)
            .map(words::mask_word),
    })
}

// =============================================================================
// GAME START
// =============================================================================

/// Handle `start-game`. A no-op when the game is already active or the
/// settings are out of range.
pub async fn start_game(state: &AppState, room_id: Uuid, user_id: Uuid, rounds: u32, draw_time_secs: u64) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };
    if room.user(user_id).is_none() {
        return;
    }
    let Some(settings) = GameSettings::validated(rounds, draw_time_secs) else {
        debug!(%room_id, rounds, draw_time_secs, "start-game dropped: settings out of range");
        return;
    };
    if room.game.is_active {
        debug!(%room_id, "start-game dropped: game already active");
        return;
    }

    let game = &mut room.game;
    game.settings = settings;
    game.is_active = true;
    game.is_round_active = false;
    game.current_round = 0;
    game.current_drawer = None;
    game.current_word = None;
    game.word_options.clear();
    game.used_words.clear();
    game.guessed.clear();
    game.round_started_at = None;
    for player in &mut game.players {
        player.score = 0;
        player.has_guessed = false;
    }
    game.epoch += 1;
    let epoch = game.epoch;

    drawing::clear(room);
    broadcast(room, &Event::named("canvas-cleared"), None);
    let started = Event::named("game-started")
        .with_data("rounds", settings.total_rounds)
        .with_data("drawTime", settings.draw_time_secs);
    broadcast(room, &started, None);
    info!(%room_id, rounds = settings.total_rounds, draw_time = settings.draw_time_secs, "game started");

    let handle = timers::schedule(state, room_id, epoch, FIRST_ROUND_DELAY, TimerAction::StartRound);
    room.timers.set_next_phase(handle);
}

// =============================================================================
// ROUND START
// =============================================================================

/// Advance to the next round: strict round-robin drawer selection, fresh
/// word options, cleared canvas. Ends the game instead when rounds are
/// exhausted or the word bank runs dry.
fn begin_round(state: &AppState, room_id: Uuid, room: &mut Room) {
    if !room.game.is_active {
        return;
    }

    let game = &mut room.game;
    game.epoch += 1;
    game.current_round += 1;
    if game.current_round > game.settings.total_rounds || game.players.is_empty() {
        finish_game(room_id, room);
        return;
    }

    let drawer_index = ((game.current_round - 1) as usize) % game.players.len();
    let drawer_id = game.players[drawer_index].id;
    game.current_drawer = Some(drawer_id);

    let options = words::pick_unused(&mut rand::thread_rng(), &game.used_words, WORD_OPTION_COUNT);
    if options.is_empty() {
        info!(%room_id, "word bank exhausted, ending game early");
        finish_game(room_id, room);
        return;
    }
    game.word_options = options.clone();
    game.current_word = None;
    game.is_round_active = false;
    game.round_started_at = None;
    game.guessed.clear();
    for player in &mut game.players {
        player.has_guessed = false;
    }
    let round = game.current_round;
    let total_rounds = game.settings.total_rounds;

    drawing::clear(room);
    broadcast(room, &Event::named("canvas-cleared"), None);

    let Some(drawer) = room.user(drawer_id).cloned() else {
        return;
    };
    let to_drawer = Event::named("round-started-drawer")
        .with_serialized("drawer", &drawer)
        .with_serialized("wordOptions", &options)
        .with_data("round", round)
        .with_data("totalRounds", total_rounds);
    send_to(room, drawer_id, to_drawer);

    let to_guessers = Event::named("round-started-guesser")
        .with_serialized("drawer", &drawer)
        .with_data("round", round)
        .with_data("totalRounds", total_rounds);
    broadcast(room, &to_guessers, Some(drawer_id));

    info!(%room_id, round, %drawer_id, "round started, waiting for word selection");
}

// =============================================================================
// WORD SELECTION
// =============================================================================

/// Handle `select-word`. Only the current drawer may select, only from the
/// offered options, and only once: a second `select-word` while the round
/// is active is rejected so the first round-end timer stands.
pub async fn select_word(state: &AppState, room_id: Uuid, user_id: Uuid, word: &str) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };

    let game = &mut room.game;
    if !game.is_active || game.is_round_active || !game.is_drawer(user_id) {
        debug!(%room_id, %user_id, "select-word dropped: wrong actor or phase");
        return;
    }
    if !game.word_options.iter().any(|w| w == word) {
        debug!(%room_id, %user_id, "select-word dropped: word not among options");
        return;
    }

    game.current_word = Some(word.to_owned());
    game.used_words.push(word.to_owned());
    game.round_started_at = Some(Instant::now());
    game.is_round_active = true;
    let epoch = game.epoch;
    let draw_time = game.settings.draw_time_secs;
    let masked = words::mask_word(word);
    let word_length = u64::try_from(word.chars().count()).unwrap_or(0);

    send_to(room, user_id, Event::named("word-selected").with_data("word", word));
    let to_guessers = Event::named("word-selected")
        .with_data("maskedWord", masked)
        .with_data("wordLength", word_length);
    broadcast(room, &to_guessers, Some(user_id));
    info!(%room_id, %user_id, draw_time, "word selected, round live");

    let handle = timers::schedule(state, room_id, epoch, Duration::from_secs(draw_time), TimerAction::EndRound);
    room.timers.set_round_end(handle);
}

// =============================================================================
// CHAT / GUESS ADJUDICATION
// =============================================================================

/// Handle `chat-message`. During an active round a non-drawer's message is
/// first tried as a guess; a correct one scores and is never echoed as
/// chat (that would leak the word to the other guessers). Everything else
/// is broadcast as chat, tagged `isGuess` when it was a failed attempt.
pub async fn chat(state: &AppState, room_id: Uuid, user_id: Uuid, message: &str) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };
    let Some(user) = room.user(user_id).cloned() else {
        return;
    };

    let guessing = room.game.is_round_active && !room.game.is_drawer(user_id);
    if guessing && is_correct_guess(message, room.game.current_word.as_deref()) {
        if room.game.player(user_id).is_some_and(|p| p.has_guessed) {
            // Repeat of an already-scored guess: dropping it keeps the
            // word out of the chat stream.
            debug!(%room_id, %user_id, "repeat correct guess dropped");
            return;
        }
        award_correct_guess(state, room_id, room, user_id);
        return;
    }

    let chat = Event::named("chat-message")
        .with_serialized("user", &user)
        .with_data("message", message)
        .with_data("timestamp", now_ms())
        .with_data("isGuess", guessing);
    broadcast(room, &chat, None);
}

fn is_correct_guess(message: &str, word: Option<&str>) -> bool {
    word.is_some_and(|w| message.trim().eq_ignore_ascii_case(w))
}

/// Points for a correct guess by 1-based order within the round.
fn guess_points(order: usize, draw_time_secs: u64, elapsed_secs: u64) -> i64 {
    let base = GUESS_BASE_SCORES[(order - 1).min(GUESS_BASE_SCORES.len() - 1)];
    let bonus = i64::try_from(draw_time_secs.saturating_sub(elapsed_secs) / 2).unwrap_or(0);
    base + bonus
}

fn award_correct_guess(state: &AppState, room_id: Uuid, room: &mut Room, guesser_id: Uuid) {
    let game = &mut room.game;
    let order = game.guessed.len() + 1;
    let points = guess_points(order, game.settings.draw_time_secs, game.round_elapsed_secs());

    let Some(player) = game.player_mut(guesser_id) else {
        return;
    };
    player.score += points;
    player.has_guessed = true;
    let guesser = player.clone();
    game.guessed.push(guesser_id);

    if let Some(drawer_id) = game.current_drawer {
        if let Some(drawer) = game.player_mut(drawer_id) {
            drawer.score += DRAWER_POINTS_PER_GUESS;
        }
    }
    let word = game.current_word.clone().unwrap_or_default();
    let leaderboard = game.leaderboard();
    let everyone_done = game.all_guessers_done();
    let epoch = game.epoch;

    // The guesser alone sees the word confirmed; peers see a null word.
    let to_guesser = Event::named("correct-guess")
        .with_serialized("player", &guesser)
        .with_data("points", points)
        .with_data("word", word);
    send_to(room, guesser_id, to_guesser);
    let to_others = Event::named("correct-guess")
        .with_serialized("player", &guesser)
        .with_data("points", points)
        .with_data("word", Value::Null);
    broadcast(room, &to_others, Some(guesser_id));

    let update = Event::named("leaderboard-update").with_serialized("leaderboard", &leaderboard);
    broadcast(room, &update, None);
    info!(%room_id, %guesser_id, order, points, "correct guess");

    if everyone_done {
        let handle = timers::schedule(state, room_id, epoch, ALL_GUESSED_DELAY, TimerAction::EndRound);
        room.timers.set_round_end(handle);
    }
}

// =============================================================================
// HINTS
// =============================================================================

/// Handle `request-hint`. Reveals one random character position to every
/// guesser. Positions are sampled fresh per request; successive hints may
/// repeat a position.
pub async fn request_hint(state: &AppState, room_id: Uuid, user_id: Uuid) {
    // Write guard even though nothing mutates: broadcasts stay serialized
    // against concurrent writers for the same room.
    let rooms = state.rooms.write().await;
    let Some(room) = rooms.get(&room_id) else {
        return;
    };
    if room.user(user_id).is_none() {
        return;
    }
    let game = &room.game;
    if !game.is_round_active {
        debug!(%room_id, %user_id, "request-hint dropped: no active round");
        return;
    }
    let Some(word) = game.current_word.as_deref() else {
        return;
    };

    let hint = words::hint(&mut rand::thread_rng(), word, HINT_REVEAL_COUNT);
    broadcast(room, &Event::named("hint-revealed").with_data("hint", hint), game.current_drawer);
}

// =============================================================================
// ROUND END
// =============================================================================

/// Handle a manual `end-round`. Equivalent to the round-end timer firing
/// early; a no-op when no round is active.
pub async fn end_round(state: &AppState, room_id: Uuid, user_id: Uuid) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        return;
    };
    if room.user(user_id).is_none() {
        return;
    }
    finish_round(state, room_id, room);
}

/// End the active round. Idempotent: a no-op when `is_round_active` is
/// already false, so a stale timer or duplicate `end-round` changes
/// nothing and broadcasts nothing.
fn finish_round(state: &AppState, room_id: Uuid, room: &mut Room) {
    if !room.game.is_round_active {
        return;
    }
    round_teardown(state, room_id, room);
}

/// End the round because the current drawer left, even before a word was
/// selected. The reveal then carries a null word.
pub(crate) fn abort_round_for_drawer_loss(state: &AppState, room_id: Uuid, room: &mut Room) {
    let awaiting_selection = room.game.is_active && !room.game.word_options.is_empty();
    if room.game.is_round_active || awaiting_selection {
        round_teardown(state, room_id, room);
    }
}

/// Shared teardown: reveal the word, publish scores, and schedule either
/// the next round or the game end.
fn round_teardown(state: &AppState, room_id: Uuid, room: &mut Room) {
    let game = &mut room.game;
    game.epoch += 1;
    let epoch = game.epoch;
    game.is_round_active = false;
    let word = game.current_word.take();
    game.word_options.clear();
    game.current_drawer = None;
    game.round_started_at = None;
    let scores = game.leaderboard();
    let was_last_round = game.current_round >= game.settings.total_rounds;

    room.timers.cancel_round_end();

    let word_value = word.clone().map(Value::String).unwrap_or(Value::Null);
    let ended = Event::named("round-ended")
        .with_data("word", word_value)
        .with_serialized("scores", &scores);
    broadcast(room, &ended, None);
    info!(%room_id, round = room.game.current_round, word = word.as_deref().unwrap_or("-"), "round ended");

    let (delay, action) = if was_last_round {
        (GAME_END_DELAY, TimerAction::EndGame)
    } else {
        (INTER_ROUND_DELAY, TimerAction::StartRound)
    };
    let handle = timers::schedule(state, room_id, epoch, delay, action);
    room.timers.set_next_phase(handle);
}

// =============================================================================
// GAME END
// =============================================================================

/// End the game: announce the winner and return to `Idle` so a new game
/// can start in the same room. Scores stay visible until the next start.
fn finish_game(room_id: Uuid, room: &mut Room) {
    let game = &mut room.game;
    game.epoch += 1;
    game.is_active = false;
    game.is_round_active = false;
    game.current_word = None;
    game.word_options.clear();
    game.current_drawer = None;
    game.round_started_at = None;
    game.current_round = 0;
    let scores = game.leaderboard();
    let winner = scores.first().cloned();

    room.timers.cancel_all();

    let mut ended = Event::named("game-ended").with_serialized("scores", &scores);
    ended = match &winner {
        Some(player) => ended.with_serialized("winner", player),
        None => ended.with_data("winner", Value::Null),
    };
    broadcast(room, &ended, None);
    info!(%room_id, winner = winner.as_ref().map(|w| w.username.as_str()).unwrap_or("-"), "game ended");
}

// =============================================================================
// TIMER DISPATCH
// =============================================================================

/// Run a due timer. No-ops when the room is gone or the game has moved on
/// since the timer was scheduled (epoch mismatch).
pub async fn on_timer(state: &AppState, room_id: Uuid, epoch: u64, action: TimerAction) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(&room_id) else {
        debug!(%room_id, ?action, "timer dropped: room gone");
        return;
    };
    if room.game.epoch != epoch {
        debug!(%room_id, ?action, epoch, current = room.game.epoch, "timer dropped: superseded");
        return;
    }
    match action {
        TimerAction::StartRound => begin_round(state, room_id, room),
        TimerAction::EndRound => finish_round(state, room_id, room),
        TimerAction::EndGame => finish_game(room_id, room),
    }
}

#[cfg(test)]
#[path = "game_test.rs"]
mod tests;
