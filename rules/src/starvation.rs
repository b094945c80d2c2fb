//! Starvation stalemate-prevention (§4.B.7).

use crate::errors::StarvationChoiceError;
use crate::model::{EliminationCause, GameEvent, GameState, PieceId, PlayerId, StarvationCandidates};
use hex::Axial;

/// `true` iff a round boundary with this many elapsed rounds-without-an-
/// elimination should trigger starvation (§8 invariant 10).
pub fn should_trigger(rounds_since_elimination: u64) -> bool {
    rounds_since_elimination == 10 || (rounds_since_elimination > 10 && (rounds_since_elimination - 10) % 5 == 0)
}

/// Computes, for every non-eliminated player, the warrior(s) tied for
/// maximum distance from the Throne. Players with no warriors contribute
/// no entry.
pub fn compute_candidates(state: &GameState) -> Vec<StarvationCandidates> {
    let mut out = Vec::new();
    for player in state.non_eliminated_players() {
        let warriors: Vec<_> = state.warriors_of(player.id).collect();
        if warriors.is_empty() {
            continue;
        }
        let max_dist = warriors.iter().map(|w| hex::hex_distance(w.position, Axial::ORIGIN)).max().expect("checked non-empty above");
        let candidates = warriors
            .iter()
            .filter(|w| hex::hex_distance(w.position, Axial::ORIGIN) == max_dist)
            .map(|w| w.id)
            .collect();
        out.push(StarvationCandidates { player_id: player.id, candidate_piece_ids: candidates });
    }
    out
}

/// Validates and records one player's starvation sacrifice choice.
/// Returns the updated `pending_starvation_choices` list; the caller
/// decides whether the round is now complete.
pub fn submit_choice(
    state: &GameState,
    player_id: PlayerId,
    piece_id: PieceId,
) -> Result<Vec<(PlayerId, PieceId)>, StarvationChoiceError> {
    let candidates = state.starvation_candidates.as_ref().ok_or(StarvationChoiceError::NotAwaitingStarvation)?;
    let entry = candidates
        .iter()
        .find(|c| c.player_id == player_id)
        .ok_or(StarvationChoiceError::NoCandidatesForPlayer)?;
    if !entry.candidate_piece_ids.contains(&piece_id) {
        return Err(StarvationChoiceError::NotACandidate);
    }

    let mut pending = state.pending_starvation_choices.clone().unwrap_or_default();
    if pending.iter().any(|(p, _)| *p == player_id) {
        return Err(StarvationChoiceError::AlreadyChosen);
    }
    pending.push((player_id, piece_id));
    Ok(pending)
}

/// `true` once every player with candidates has submitted a choice.
pub fn round_complete(candidates: &[StarvationCandidates], pending: &[(PlayerId, PieceId)]) -> bool {
    candidates.iter().all(|c| pending.iter().any(|(p, _)| *p == c.player_id))
}

/// Removes the chosen warriors and emits one `ELIMINATED{cause=starvation}`
/// event per removal. Does not touch phase or `rounds_since_elimination` —
/// the caller (the state machine) handles those per §4.C.
pub fn resolve_round(state: &mut GameState, pending: &[(PlayerId, PieceId)]) -> Vec<GameEvent> {
    let mut events = Vec::with_capacity(pending.len());
    for (_, piece_id) in pending {
        if let Some(pos) = state.pieces.iter().find(|p| p.id == *piece_id).map(|p| p.position) {
            state.pieces.retain(|p| p.id != *piece_id);
            events.push(GameEvent::Eliminated { piece_id: *piece_id, position: pos, cause: EliminationCause::Starvation });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_table_matches_spec() {
        assert!(!should_trigger(9));
        assert!(should_trigger(10));
        assert!(!should_trigger(11));
        assert!(!should_trigger(14));
        assert!(should_trigger(15));
        assert!(should_trigger(20));
        assert!(!should_trigger(21));
    }
}
