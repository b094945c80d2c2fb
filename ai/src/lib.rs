//! The AI adapter boundary (§4.I). `AiAdapter` is the pluggable capability
//! the game manager invokes on an AI player's turn; `HeuristicAi` is the
//! one concrete, fully-local implementation wired end to end, and `LlmAi`
//! models the shape of the hosted-LLM alternative without making a real
//! network call (out of scope per §1 — see SPEC_FULL.md §C).

use async_trait::async_trait;
use hex::Axial;
use rules::{valid_moves, GameState, PieceId, PlayerId};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// The move an adapter hands back to the manager, fed through the same
/// `makeMove` path a human player's command takes.
#[derive(Debug, Clone, Copy)]
pub struct MoveCommand {
    pub piece_id: PieceId,
    pub destination: Axial,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI player has no legal moves")]
    NoLegalMoves,
    #[error("AI adapter invocation timed out")]
    Timeout,
    #[error("AI adapter failed: {0}")]
    Adapter(String),
}

/// §5 Cancellation & timeouts: invocations carry a timeout; on expiry the
/// caller (the manager) treats it as `AiError::Timeout` and pauses or
/// forces a move per its own policy (§9).
#[async_trait]
pub trait AiAdapter: Send + Sync {
    async fn generate_move(&self, state: &GameState, player_id: PlayerId) -> Result<MoveCommand, AiError>;

    /// Optional: an adapter that has no opinion about which warrior to
    /// sacrifice during starvation defers to the manager's deterministic
    /// fallback (lowest-id candidate, per §5).
    async fn generate_starvation_choice(&self, _state: &GameState, _player_id: PlayerId) -> Option<PieceId> {
        None
    }
}

/// Runs `adapter.generate_move` with the manager-side timeout described in
/// §5. A thin wrapper rather than a trait method so every adapter gets the
/// same timeout policy without re-implementing it.
pub async fn generate_move_with_timeout(
    adapter: &dyn AiAdapter,
    state: &GameState,
    player_id: PlayerId,
    timeout: Duration,
) -> Result<MoveCommand, AiError> {
    match tokio::time::timeout(timeout, adapter.generate_move(state, player_id)).await {
        Ok(result) => result,
        Err(_) => Err(AiError::Timeout),
    }
}

/// Enumerates every legal move across the player's pieces via the rules
/// engine and scores them: a legal attack beats a plain move, a momentum
/// move beats a non-momentum one, ties broken by a seeded RNG so the same
/// seed reproduces the same game (§4.B preamble's determinism requirement,
/// extended to AI turns).
pub struct HeuristicAi {
    rng: Mutex<rand_xoshiro::Xoshiro256PlusPlus>,
}

impl HeuristicAi {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        HeuristicAi { rng: Mutex::new(rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed)) }
    }

    fn score(is_attack: bool, has_momentum: bool) -> u8 {
        match (is_attack, has_momentum) {
            (true, true) => 3,
            (true, false) => 2,
            (false, true) => 1,
            (false, false) => 0,
        }
    }
}

#[async_trait]
impl AiAdapter for HeuristicAi {
    async fn generate_move(&self, state: &GameState, player_id: PlayerId) -> Result<MoveCommand, AiError> {
        let mut candidates: Vec<(PieceId, Axial, u8)> = Vec::new();

        for piece in state.pieces.iter().filter(|p| p.player_id == Some(player_id)) {
            for candidate in valid_moves(state, piece.id) {
                let score = Self::score(candidate.is_attack, candidate.has_momentum);
                candidates.push((piece.id, candidate.to, score));
            }
        }

        let Some(best_score) = candidates.iter().map(|(_, _, s)| *s).max() else {
            return Err(AiError::NoLegalMoves);
        };
        let best: Vec<_> = candidates.into_iter().filter(|(_, _, s)| *s == best_score).collect();

        let index = {
            use rand::Rng;
            let mut rng = self.rng.lock().expect("heuristic AI rng poisoned");
            rng.gen_range(0..best.len())
        };
        let (piece_id, destination, _) = best[index];
        Ok(MoveCommand { piece_id, destination })
    }

    async fn generate_starvation_choice(&self, state: &GameState, player_id: PlayerId) -> Option<PieceId> {
        let candidates = state.starvation_candidates.as_ref()?;
        let entry = candidates.iter().find(|c| c.player_id == player_id)?;
        entry.candidate_piece_ids.first().copied()
    }
}

/// Models the external-call shape of a hosted-LLM adapter: async, fallible,
/// and subject to the same timeout wrapper as any other adapter. The
/// actual network call is out of scope (§1) — this stub exists so the
/// adapter boundary it plugs into is exercised and compiles.
pub struct LlmAi {
    pub model: String,
    pub custom_prompt: Option<String>,
}

#[async_trait]
impl AiAdapter for LlmAi {
    async fn generate_move(&self, _state: &GameState, _player_id: PlayerId) -> Result<MoveCommand, AiError> {
        Err(AiError::Adapter(format!("hosted LLM call to '{}' is not implemented", self.model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::{GameConfig, Phase};
    use uuid::Uuid;

    fn two_player_playing_state() -> (GameState, PlayerId) {
        let mut state = GameState::new(Uuid::new_v4(), GameConfig { board_radius: 3, ..Default::default() });
        let a = rules::Player { id: Uuid::new_v4(), name: "A".into(), color: "red".into(), is_eliminated: false, is_ai: true, ai_config: None };
        let b = rules::Player { id: Uuid::new_v4(), name: "B".into(), color: "blue".into(), is_eliminated: false, is_ai: false, ai_config: None };
        let a_id = a.id;
        state.players = vec![a, b];
        state.phase = Phase::Playing;
        state.current_player_id = Some(a_id);
        let used = rules::populate_initial_layout(&mut state);
        rules::generate_holes(&mut state, &used, 1);
        (state, a_id)
    }

    #[tokio::test]
    async fn heuristic_ai_picks_a_legal_move() {
        let (state, a_id) = two_player_playing_state();
        let ai = HeuristicAi::new(99);
        let command = ai.generate_move(&state, a_id).await.expect("a fresh board always has legal moves");
        assert!(rules::valid_moves(&state, command.piece_id).iter().any(|m| m.to == command.destination));
    }

    #[tokio::test]
    async fn llm_stub_reports_unimplemented_rather_than_panicking() {
        let (state, a_id) = two_player_playing_state();
        let ai = LlmAi { model: "claude".into(), custom_prompt: None };
        assert!(ai.generate_move(&state, a_id).await.is_err());
    }
}
