//! Plain-assertion self-checks for the universal invariants in §8 of the
//! specification. Run after every transition in debug builds (wired from
//! [`crate::engine::apply_move`]); never compiled into release builds,
//! matching the teacher's preference for `debug_assert!`-style checks
//! over a property-testing framework.

use crate::model::{GameState, Phase, PieceType};
use std::collections::HashSet;

pub fn check_all(state: &GameState) {
    check_position_uniqueness(state);
    check_board_containment(state);
    check_jarl_count(state);
}

fn check_position_uniqueness(state: &GameState) {
    let mut seen = HashSet::new();
    for piece in &state.pieces {
        assert!(seen.insert(piece.position), "duplicate piece position at {:?}", piece.position);
        assert!(!state.holes.contains(&piece.position), "piece sitting on a hole at {:?}", piece.position);
    }
}

fn check_board_containment(state: &GameState) {
    for piece in &state.pieces {
        assert!(
            hex::is_on_board(piece.position, state.config.board_radius),
            "piece {:?} off board at {:?}",
            piece.id,
            piece.position
        );
    }
}

fn check_jarl_count(state: &GameState) {
    if !matches!(state.phase, Phase::Playing | Phase::Starvation | Phase::Paused) {
        return;
    }
    for player in state.non_eliminated_players() {
        let jarls = state.pieces.iter().filter(|p| p.kind == PieceType::Jarl && p.player_id == Some(player.id)).count();
        assert_eq!(jarls, 1, "player {:?} has {} jarls", player.id, jarls);
    }
}
