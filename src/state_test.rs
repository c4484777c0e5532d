use super::*;

#[test]
fn room_new_is_empty() {
    let room = Room::new("doodles");
    assert_eq!(room.name, "doodles");
    assert!(room.created_at > 0);
    assert!(room.users.is_empty());
    assert!(room.clients.is_empty());
    assert!(room.strokes.is_empty());
    assert!(!room.game.is_active);
}

#[test]
fn random_color_comes_from_palette() {
    for _ in 0..32 {
        let user = User::with_random_color(Uuid::new_v4(), "ada");
        assert!(USER_PALETTE.contains(&user.color.as_str()), "unexpected color {}", user.color);
    }
}

#[test]
fn settings_validation_bounds() {
    assert!(GameSettings::validated(1, 30).is_some());
    assert!(GameSettings::validated(10, 180).is_some());
    assert!(GameSettings::validated(0, 60).is_none());
    assert!(GameSettings::validated(11, 60).is_none());
    assert!(GameSettings::validated(3, 29).is_none());
    assert!(GameSettings::validated(3, 181).is_none());
}

#[test]
fn add_player_is_idempotent_on_duplicate_id() {
    let mut game = Game::new();
    let id = Uuid::new_v4();
    game.add_player(id, "ada");
    game.add_player(id, "ada");
    assert_eq!(game.players.len(), 1);
}

#[test]
fn remove_player_clears_round_trace() {
    let mut game = Game::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    game.add_player(a, "ada");
    game.add_player(b, "bob");
    game.guessed.push(b);

    game.remove_player(b);

    assert_eq!(game.players.len(), 1);
    assert!(game.guessed.is_empty());
}

#[test]
fn all_guessers_done_ignores_the_drawer() {
    let mut game = Game::new();
    let drawer = Uuid::new_v4();
    let guesser = Uuid::new_v4();
    game.add_player(drawer, "ada");
    game.add_player(guesser, "bob");
    game.current_drawer = Some(drawer);

    assert!(!game.all_guessers_done());
    if let Some(p) = game.player_mut(guesser) {
        p.has_guessed = true;
    }
    assert!(game.all_guessers_done(), "drawer's has_guessed must not matter");
}

#[test]
fn leaderboard_sorts_by_score_descending() {
    let mut game = Game::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    game.add_player(a, "ada");
    game.add_player(b, "bob");
    game.add_player(c, "cyd");
    game.player_mut(b).expect("player").score = 125;
    game.player_mut(c).expect("player").score = 50;

    let board = game.leaderboard();
    assert_eq!(board[0].id, b);
    assert_eq!(board[1].id, c);
    assert_eq!(board[2].id, a);
}

#[test]
fn stroke_event_wire_shape() {
    let user_id = Uuid::new_v4();
    let stroke = test_helpers::dummy_stroke(user_id);

    let value = serde_json::to_value(&stroke).expect("serialize");
    assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("draw"));
    assert_eq!(value.get("color").and_then(|v| v.as_str()), Some("#000000"));
    assert!(value.get("lineWidth").is_some(), "lineWidth must be camelCase");
    assert_eq!(
        value.get("userId").and_then(|v| v.as_str()),
        Some(user_id.to_string().as_str())
    );
    assert_eq!(value.get("points").and_then(|v| v.as_array()).map(Vec::len), Some(2));

    let restored: StrokeEvent = serde_json::from_value(value).expect("deserialize");
    assert_eq!(restored.data.kind, "draw");
    assert!((restored.data.line_width - 2.0).abs() < f64::EPSILON);
}
