//! Move execution and post-move processing (§4.B.4 through §4.B.6): the
//! single pure entry point that turns a validated command into a new
//! `GameState` plus the event stream that both persistence and clients
//! consume (Design Notes §9 — "keep emission inside the pure rules
//! engine").

use crate::combat::ChainStep;
use crate::errors::ValidationError;
use crate::model::{EliminationCause, GameEvent, GameState, PieceId, Phase, Player, PlayerId, WinCondition};
use crate::moves::{validate_move, MoveKind};
use crate::starvation;
use hex::Axial;

pub struct MoveOutcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

fn move_piece(state: &mut GameState, piece_id: PieceId, to: Axial) {
    if let Some(p) = state.pieces.iter_mut().find(|p| p.id == piece_id) {
        p.position = to;
    }
}

fn remove_piece(state: &mut GameState, piece_id: PieceId) {
    state.pieces.retain(|p| p.id != piece_id);
}

fn apply_chain(state: &mut GameState, events: &mut Vec<GameEvent>, chain: Vec<ChainStep>) {
    for (depth, step) in chain.into_iter().enumerate() {
        match step.eliminated {
            Some(cause) => {
                remove_piece(state, step.piece_id);
                events.push(GameEvent::Eliminated { piece_id: step.piece_id, position: step.to, cause });
            }
            None => {
                move_piece(state, step.piece_id, step.to);
                events.push(GameEvent::Push { piece_id: step.piece_id, from: step.from, to: step.to, depth: depth as u32 });
            }
        }
    }
}

fn next_seat(players: &[Player], from_seat: usize) -> Option<usize> {
    let n = players.len();
    if n == 0 {
        return None;
    }
    let mut seat = (from_seat + 1) % n;
    for _ in 0..n {
        if !players[seat].is_eliminated {
            return Some(seat);
        }
        seat = (seat + 1) % n;
    }
    None
}

/// Applies `(pieceId, destination)` from `player_id` to `state`, returning
/// the resulting state and event stream, or the specific validation
/// failure (§4.B.2). `state` is never mutated in place — the caller (the
/// state machine) swaps in the returned state only on success.
pub fn apply_move(
    state: &GameState,
    player_id: PlayerId,
    piece_id: PieceId,
    destination: Axial,
) -> Result<MoveOutcome, ValidationError> {
    let validated = validate_move(state, player_id, piece_id, destination)?;
    let mut new_state = state.clone();
    let mut events = Vec::new();

    let piece = new_state.piece(piece_id).expect("validated piece must exist").clone();
    let from = piece.position;
    let to = validated.adjusted_destination.unwrap_or(destination);

    events.push(GameEvent::Move { piece_id, from, to, has_momentum: validated.has_momentum });
    move_piece(&mut new_state, piece_id, to);

    if let MoveKind::Attack(sim) = validated.kind {
        let chain = sim.chain.expect("legal attack must carry a resolved chain");
        apply_chain(&mut new_state, &mut events, chain);
    }

    post_move_processing(&mut new_state, &mut events, piece_id);

    #[cfg(debug_assertions)]
    crate::invariants::check_all(&new_state);

    Ok(MoveOutcome { state: new_state, events })
}

/// Re-derives elimination (jarl-less players drop out) and last-standing
/// victory from the current piece set, appending any resulting events.
/// Used both after an in-chain capture and after starvation sacrifices or
/// a disconnect-grace-timer forfeiture remove a jarl outside the normal
/// move pipeline. Returns `true` if the game ended.
pub fn check_win_conditions(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let mut newly_eliminated = false;
    let player_ids: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
    for player_id in player_ids {
        let still_alive = !state.players.iter().find(|p| p.id == player_id).expect("id collected from this same player list").is_eliminated;
        if still_alive && state.jarl_of(player_id).is_none() {
            if let Some(p) = state.players.iter_mut().find(|p| p.id == player_id) {
                p.is_eliminated = true;
            }
            state.pieces.retain(|p| p.player_id != Some(player_id));
            newly_eliminated = true;
        }
    }

    let remaining: Vec<PlayerId> = state.non_eliminated_players().map(|p| p.id).collect();
    if remaining.len() == 1 {
        let winner_id = remaining[0];
        state.phase = Phase::Ended;
        state.winner_id = Some(winner_id);
        state.win_condition = Some(WinCondition::LastStanding);
        events.push(GameEvent::GameEnded { winner_id, win_condition: WinCondition::LastStanding });
        return true;
    }
    // `remaining.is_empty()` is an unreachable-in-practice double
    // elimination inside one push chain (§9 open question: spec does not
    // define this case). The game simply continues with no winner
    // declared rather than crashing.
    newly_eliminated
}

fn post_move_processing(state: &mut GameState, events: &mut Vec<GameEvent>, moved_piece_id: PieceId) {
    // Throne victory (§4.B.6 step 2): only the piece the player actively
    // moved can ever land on the Throne — pushed pieces are blocked by
    // compression before they get there.
    if let Some(piece) = state.piece(moved_piece_id) {
        if piece.kind == crate::model::PieceType::Jarl && piece.position == Axial::ORIGIN {
            if let Some(player_id) = piece.player_id {
                state.phase = Phase::Ended;
                state.winner_id = Some(player_id);
                state.win_condition = Some(WinCondition::Throne);
                events.push(GameEvent::GameEnded { winner_id: player_id, win_condition: WinCondition::Throne });
                return;
            }
        }
    }

    // Elimination victory (§4.B.6 step 3).
    check_win_conditions(state, events);
    if state.phase == Phase::Ended {
        return;
    }

    let had_elimination = events.iter().any(|e| matches!(e, GameEvent::Eliminated { .. }));

    // Turn/round advance (§4.B.6 step 4).
    state.turn_number += 1;
    let current_seat = state
        .players
        .iter()
        .position(|p| Some(p.id) == state.current_player_id)
        .unwrap_or(0);
    let Some(next) = next_seat(&state.players, current_seat) else {
        return;
    };
    let round_boundary = next <= current_seat;
    state.current_player_id = Some(state.players[next].id);

    if had_elimination {
        state.rounds_since_elimination = 0;
    } else if round_boundary {
        state.rounds_since_elimination += 1;
    }

    if round_boundary {
        state.round_number += 1;
        if starvation::should_trigger(state.rounds_since_elimination) {
            let candidates = starvation::compute_candidates(state);
            if !candidates.is_empty() {
                state.phase = Phase::Starvation;
                state.starvation_candidates = Some(candidates);
                state.pending_starvation_choices = Some(Vec::new());
            }
        }
    }
}
