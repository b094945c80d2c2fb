//! The per-game state machine (§4.C): `lobby -> playing -> {starvation,
//! paused} -> ended`. This is the only place mutable `GameState` lives
//! outside of a test — the manager holds one `GameMachine` per game behind
//! its per-game lock and calls these methods under that lock.

use crate::errors::{JoinError, StarvationTurnError, StartError, TurnError};
use rules::{GameConfig, GameEvent, GameId, GameState, PieceId, Phase, Player, PlayerId};
use hex::Axial;
use uuid::Uuid;

pub struct GameMachine {
    pub state: GameState,
}

impl GameMachine {
    pub fn new(id: GameId, config: GameConfig) -> Self {
        GameMachine { state: GameState::new(id, config) }
    }

    /// Rehydrates a machine around a snapshot loaded from the store
    /// (§4.D `loadSnapshot`) — used by `manager::recover`.
    pub fn from_state(state: GameState) -> Self {
        GameMachine { state }
    }

    pub fn host_id(&self) -> Option<PlayerId> {
        self.state.players.first().map(|p| p.id)
    }

    /// `lobby --PLAYER_JOINED--> lobby`.
    pub fn join(&mut self, player_name: String, is_ai: bool, ai_config: Option<rules::AiConfig>) -> Result<PlayerId, JoinError> {
        if self.state.phase != Phase::Lobby {
            return Err(JoinError::NotInLobby);
        }
        if self.state.players.len() >= self.state.config.player_count as usize {
            return Err(JoinError::GameFull);
        }
        let id = Uuid::new_v4();
        self.state.players.push(Player {
            id,
            name: player_name,
            color: color_for_seat(self.state.players.len()),
            is_eliminated: false,
            is_ai,
            ai_config,
        });
        Ok(id)
    }

    /// `lobby --PLAYER_LEFT--> lobby`. No-op once the game has started —
    /// leaving mid-game is a disconnect, not a roster change.
    pub fn leave(&mut self, player_id: PlayerId) {
        if self.state.phase == Phase::Lobby {
            self.state.players.retain(|p| p.id != player_id);
        }
    }

    /// `lobby --START_GAME(hostId)--> playing`.
    pub fn start(&mut self, caller: PlayerId, seed: u64) -> Result<(), StartError> {
        if self.state.phase != Phase::Lobby {
            return Err(StartError::NotInLobby);
        }
        if self.host_id() != Some(caller) {
            return Err(StartError::NotHost);
        }
        if self.state.players.len() < 2 {
            return Err(StartError::NotEnoughPlayers);
        }

        let used = rules::populate_initial_layout(&mut self.state);
        rules::generate_holes(&mut self.state, &used, seed);
        self.state.current_player_id = self.state.players.first().map(|p| p.id);
        self.state.phase = Phase::Playing;
        Ok(())
    }

    /// `playing --PLAY_TURN--> playing | starvation | ended`.
    pub fn play_turn(
        &mut self,
        player_id: PlayerId,
        piece_id: PieceId,
        destination: Axial,
        client_turn_number: Option<u64>,
    ) -> Result<Vec<GameEvent>, TurnError> {
        if let Some(expected) = client_turn_number {
            if expected != self.state.turn_number {
                return Err(TurnError::StaleTurn);
            }
        }
        let outcome = rules::apply_move(&self.state, player_id, piece_id, destination)?;
        self.state = outcome.state;
        Ok(outcome.events)
    }

    /// `starvation --STARVATION_CHOICE--> starvation | playing | ended`.
    pub fn submit_starvation_choice(&mut self, player_id: PlayerId, piece_id: PieceId) -> Result<Vec<GameEvent>, StarvationTurnError> {
        if self.state.phase != Phase::Starvation {
            return Err(StarvationTurnError::NotAwaitingStarvation);
        }
        let candidates = self.state.starvation_candidates.clone().unwrap_or_default();
        let pending = rules::starvation::submit_choice(&self.state, player_id, piece_id)?;
        self.state.pending_starvation_choices = Some(pending.clone());

        if !rules::starvation::round_complete(&candidates, &pending) {
            return Ok(Vec::new());
        }

        let mut events = rules::starvation::resolve_round(&mut self.state, &pending);
        self.state.starvation_candidates = None;
        self.state.pending_starvation_choices = None;
        self.state.rounds_since_elimination = 0;
        rules::check_win_conditions(&mut self.state, &mut events);
        if self.state.phase != Phase::Ended {
            self.state.phase = Phase::Playing;
        }
        Ok(events)
    }

    /// `playing --PLAYER_DISCONNECTED--> paused`. Generalized to also pause
    /// a `starvation` round in progress (the spec's diagram only shows the
    /// `playing` arrow explicitly, but an absent player can no longer
    /// submit a starvation choice either — see DESIGN.md).
    pub fn disconnect(&mut self, player_id: PlayerId) -> bool {
        if !self.state.disconnected_players.contains(&player_id) {
            self.state.disconnected_players.push(player_id);
        }
        if matches!(self.state.phase, Phase::Playing | Phase::Starvation) {
            self.state.phase = Phase::Paused;
            true
        } else {
            false
        }
    }

    /// `paused --PLAYER_RECONNECTED--> playing` once every disconnected
    /// player is back. If forfeiture already ended the game while this
    /// player was away, the phase is already `ended` and this is a no-op.
    pub fn reconnect(&mut self, player_id: PlayerId) -> bool {
        self.state.disconnected_players.retain(|p| *p != player_id);
        if self.state.phase == Phase::Paused && self.state.disconnected_players.is_empty() {
            self.state.phase = Phase::Playing;
            true
        } else {
            false
        }
    }

    /// Grace-timer expiry (§4.E `onDisconnect`): removes the player's
    /// pieces, marks them eliminated and forfeited, re-evaluates win
    /// conditions, and resumes play if the game did not just end.
    pub fn forfeit(&mut self, player_id: PlayerId) -> Vec<GameEvent> {
        self.state.disconnected_players.retain(|p| *p != player_id);
        if !self.state.forfeited_players.contains(&player_id) {
            self.state.forfeited_players.push(player_id);
        }
        if let Some(p) = self.state.players.iter_mut().find(|p| p.id == player_id) {
            p.is_eliminated = true;
        }
        self.state.pieces.retain(|p| p.player_id != Some(player_id));

        let mut events = Vec::new();
        rules::check_win_conditions(&mut self.state, &mut events);

        if self.state.phase != Phase::Ended && self.state.current_player_id == Some(player_id) {
            self.advance_turn_past_forfeiture();
        }
        if self.state.phase == Phase::Paused && self.state.disconnected_players.is_empty() {
            self.state.phase = Phase::Playing;
        }
        events
    }

    /// Moves `currentPlayerId` to the next non-eliminated seat after the
    /// player who just forfeited — the regular turn advance in
    /// `rules::engine` only runs as part of a played move, so a
    /// grace-timer expiry has to do this itself.
    fn advance_turn_past_forfeiture(&mut self) {
        let n = self.state.players.len();
        if n == 0 {
            return;
        }
        let Some(current_seat) = self.state.players.iter().position(|p| Some(p.id) == self.state.current_player_id) else {
            return;
        };
        let mut seat = (current_seat + 1) % n;
        for _ in 0..n {
            if !self.state.players[seat].is_eliminated {
                self.state.current_player_id = Some(self.state.players[seat].id);
                return;
            }
            seat = (seat + 1) % n;
        }
    }

    pub fn is_ai_turn(&self) -> bool {
        self.state
            .current_player_id
            .and_then(|id| self.state.players.iter().find(|p| p.id == id))
            .map(|p| p.is_ai)
            .unwrap_or(false)
    }
}

const SEAT_COLORS: [&str; 6] = ["red", "blue", "green", "yellow", "purple", "orange"];

fn color_for_seat(seat: usize) -> String {
    SEAT_COLORS[seat % SEAT_COLORS.len()].to_string()
}
