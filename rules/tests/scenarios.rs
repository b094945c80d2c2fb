//! The concrete end-to-end scenarios from §8 of the specification,
//! reproduced with literal board positions.

use hex::Axial;
use rules::*;
use uuid::Uuid;

fn player(name: &str) -> Player {
    Player { id: Uuid::new_v4(), name: name.to_string(), color: "red".to_string(), is_eliminated: false, is_ai: false, ai_config: None }
}

fn piece(kind: PieceType, player_id: PlayerId, q: i32, r: i32) -> Piece {
    Piece { id: Uuid::new_v4(), kind, player_id: Some(player_id), position: Axial::new(q, r) }
}

fn base_state(radius: i32, players: Vec<Player>) -> GameState {
    let mut state = GameState::new(Uuid::new_v4(), GameConfig { board_radius: radius, ..Default::default() });
    let current = players[0].id;
    state.players = players;
    state.phase = Phase::Playing;
    state.current_player_id = Some(current);
    state
}

#[test]
fn scenario_1_throne_victory_via_two_hex_draft_move() {
    let a = player("A");
    let b = player("B");
    let mut state = base_state(4, vec![a.clone(), b.clone()]);

    let jarl = piece(PieceType::Jarl, a.id, 2, 0);
    let jarl_id = jarl.id;
    state.pieces.push(jarl);
    state.pieces.push(piece(PieceType::Warrior, a.id, 3, 0));
    state.pieces.push(piece(PieceType::Warrior, a.id, 4, 0));
    state.pieces.push(piece(PieceType::Jarl, b.id, -4, 0));

    let outcome = apply_move(&state, a.id, jarl_id, Axial::new(0, 0)).expect("legal move");

    assert!(matches!(
        outcome.events[0],
        GameEvent::Move { has_momentum: true, to, .. } if to == Axial::new(0, 0)
    ));
    assert!(matches!(
        outcome.events[1],
        GameEvent::GameEnded { winner_id, win_condition: WinCondition::Throne } if winner_id == a.id
    ));
    assert_eq!(outcome.state.phase, Phase::Ended);
    assert_eq!(outcome.state.winner_id, Some(a.id));
}

#[test]
fn scenario_2_compression_blocks_the_attack_entirely() {
    let a = player("A");
    let b = player("B");
    let mut state = base_state(4, vec![a.clone(), b.clone()]);

    let jarl = piece(PieceType::Jarl, a.id, -2, 0);
    let jarl_id = jarl.id;
    state.pieces.push(jarl);
    state.pieces.push(piece(PieceType::Warrior, b.id, -1, 0));
    state.pieces.push(piece(PieceType::Jarl, b.id, 4, 0));

    let moves = valid_moves(&state, jarl_id);
    assert!(
        !moves.iter().any(|m| m.to == Axial::new(-1, 0)),
        "compressed attack onto a throne-blocked hex must not be enumerated as legal"
    );

    let err = apply_move(&state, a.id, jarl_id, Axial::new(-1, 0)).unwrap_err();
    assert_eq!(err, ValidationError::PathBlocked);
}

#[test]
fn scenario_3_push_into_empty_hex_emits_push_not_elimination() {
    let a = player("A");
    let b = player("B");
    let mut state = base_state(3, vec![a.clone(), b.clone()]);

    let jarl = piece(PieceType::Jarl, a.id, 1, 0);
    let jarl_id = jarl.id;
    state.pieces.push(jarl);
    state.pieces.push(piece(PieceType::Warrior, b.id, 2, 0));
    state.pieces.push(piece(PieceType::Jarl, b.id, -3, 0));

    let outcome = apply_move(&state, a.id, jarl_id, Axial::new(2, 0)).expect("legal push");
    assert!(matches!(outcome.events[0], GameEvent::Move { .. }));
    assert!(matches!(
        outcome.events[1],
        GameEvent::Push { to, depth: 0, .. } if to == Axial::new(3, 0)
    ));
    assert!(!outcome.events.iter().any(|e| matches!(e, GameEvent::Eliminated { .. })));
}

#[test]
fn scenario_3b_push_off_the_edge_eliminates_the_defender() {
    let a = player("A");
    let b = player("B");
    let mut state = base_state(3, vec![a.clone(), b.clone()]);

    let jarl = piece(PieceType::Jarl, a.id, 2, 0);
    let jarl_id = jarl.id;
    state.pieces.push(jarl);
    state.pieces.push(piece(PieceType::Warrior, b.id, 3, 0));
    state.pieces.push(piece(PieceType::Jarl, b.id, -3, 0));

    let outcome = apply_move(&state, a.id, jarl_id, Axial::new(3, 0)).expect("legal push off edge");
    assert!(matches!(
        outcome.events[1],
        GameEvent::Eliminated { cause: EliminationCause::Edge, .. }
    ));
    let attacker = outcome.state.piece(jarl_id).unwrap();
    assert_eq!(attacker.position, Axial::new(3, 0));
}

#[test]
fn scenario_5_starvation_triggers_at_round_ten_and_resolves() {
    let a = player("A");
    let b = player("B");
    let mut state = base_state(6, vec![a.clone(), b.clone()]);
    state.rounds_since_elimination = 9;

    let jarl_a = piece(PieceType::Jarl, a.id, 6, -6);
    let jarl_a_id = jarl_a.id;
    state.pieces.push(jarl_a);
    let warrior_a = piece(PieceType::Warrior, a.id, 5, 0);
    state.pieces.push(warrior_a);

    let jarl_b = piece(PieceType::Jarl, b.id, -6, 6);
    state.pieces.push(jarl_b);
    let warrior_b = piece(PieceType::Warrior, b.id, -5, 0);
    state.pieces.push(warrior_b);

    // A plays a harmless one-hex move, then B does too, completing the round.
    let a_dest = {
        let mv = valid_moves(&state, jarl_a_id).into_iter().find(|m| !m.is_attack).unwrap();
        mv.to
    };
    let after_a = apply_move(&state, a.id, jarl_a_id, a_dest).unwrap();
    state = after_a.state;

    let jarl_b_id = state.jarl_of(b.id).unwrap().id;
    let b_dest = {
        let mv = valid_moves(&state, jarl_b_id).into_iter().find(|m| !m.is_attack).unwrap();
        mv.to
    };
    let after_b = apply_move(&state, b.id, jarl_b_id, b_dest).unwrap();
    state = after_b.state;

    assert_eq!(state.rounds_since_elimination, 10);
    assert_eq!(state.phase, Phase::Starvation);
    let candidates = state.starvation_candidates.clone().expect("candidates computed");
    assert_eq!(candidates.len(), 2);

    let piece_a = candidates.iter().find(|c| c.player_id == a.id).unwrap().candidate_piece_ids[0];
    let piece_b = candidates.iter().find(|c| c.player_id == b.id).unwrap().candidate_piece_ids[0];

    let pending_a = starvation::submit_choice(&state, a.id, piece_a).unwrap();
    state.pending_starvation_choices = Some(pending_a.clone());
    assert!(!starvation::round_complete(&candidates, &pending_a));

    let pending_b = starvation::submit_choice(&state, b.id, piece_b).unwrap();
    assert!(starvation::round_complete(&candidates, &pending_b));

    let events = starvation::resolve_round(&mut state, &pending_b);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| matches!(e, GameEvent::Eliminated { cause: EliminationCause::Starvation, .. })));
}
