//! The data model shared by every pure function in this crate (§3 of the
//! specification). Everything here is plain data — no behavior beyond
//! small, obviously-total helpers lives on these types; the transitions
//! that produce new values of them live in [`crate::engine`] and friends.

use hex::Axial;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;
pub type PieceId = Uuid;
pub type GameId = Uuid;

/// Board terrain preset, controlling how many holes are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Calm,
    Treacherous,
    Chaotic,
}

impl Terrain {
    /// The nominal hole count for this terrain, before capping by the
    /// number of eligible positions on the board.
    pub fn hole_count(self) -> usize {
        match self {
            Terrain::Calm => 3,
            Terrain::Treacherous => 6,
            Terrain::Chaotic => 9,
        }
    }
}

/// Immutable per-game configuration, fixed at creation time. Every field
/// is optional on the wire (§6 `POST /api/games`) and falls back to
/// `Default::default()`'s value when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_player_count")]
    pub player_count: u8,
    #[serde(default = "default_board_radius")]
    pub board_radius: i32,
    #[serde(default = "default_warrior_count")]
    pub warrior_count: u8,
    #[serde(default)]
    pub turn_timer_ms: Option<u64>,
    #[serde(default)]
    pub terrain: Terrain,
}

fn default_player_count() -> u8 {
    2
}

fn default_board_radius() -> i32 {
    3
}

fn default_warrior_count() -> u8 {
    5
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::Calm
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            player_count: 2,
            board_radius: 3,
            warrior_count: 5,
            turn_timer_ms: None,
            terrain: Terrain::Calm,
        }
    }
}

/// Which hosted AI variant (if any) drives a player's turns. The call
/// itself is an external collaborator (§1); only the selection is part
/// of the data model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(rename = "type")]
    pub kind: AiKind,
    pub difficulty: u8,
    pub model: Option<String>,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiKind {
    Heuristic,
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub is_eliminated: bool,
    pub is_ai: bool,
    pub ai_config: Option<AiConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Jarl,
    Warrior,
}

impl PieceType {
    pub fn strength(self) -> i32 {
        match self {
            PieceType::Jarl => 2,
            PieceType::Warrior => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    #[serde(rename = "type")]
    pub kind: PieceType,
    /// `None` for neutral pieces — unused in the current ruleset but kept
    /// to match the data model in the specification verbatim.
    pub player_id: Option<PlayerId>,
    pub position: Axial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliminationCause {
    Edge,
    Hole,
    Starvation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinCondition {
    Throne,
    LastStanding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename = "MOVE")]
    Move { piece_id: PieceId, from: Axial, to: Axial, has_momentum: bool },
    #[serde(rename = "PUSH")]
    Push { piece_id: PieceId, from: Axial, to: Axial, depth: u32 },
    #[serde(rename = "ELIMINATED")]
    Eliminated { piece_id: PieceId, position: Axial, cause: EliminationCause },
    #[serde(rename = "GAME_ENDED")]
    GameEnded { winner_id: PlayerId, win_condition: WinCondition },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Playing,
    Starvation,
    Paused,
    Ended,
}

/// The per-player candidate set during a starvation round (§4.B.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarvationCandidates {
    pub player_id: PlayerId,
    pub candidate_piece_ids: Vec<PieceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: GameId,
    pub phase: Phase,
    pub config: GameConfig,
    pub players: Vec<Player>,
    pub pieces: Vec<Piece>,
    pub holes: Vec<Axial>,
    pub current_player_id: Option<PlayerId>,
    pub turn_number: u64,
    pub round_number: u64,
    pub rounds_since_elimination: u64,
    pub winner_id: Option<PlayerId>,
    pub win_condition: Option<WinCondition>,
    pub starvation_candidates: Option<Vec<StarvationCandidates>>,
    pub pending_starvation_choices: Option<Vec<(PlayerId, PieceId)>>,
    pub disconnected_players: Vec<PlayerId>,
    /// Players whose session has been forfeited (jarl removed) via the
    /// disconnect grace-timer expiry in the manager; retained on the
    /// state so a reconnect after forfeiture is a no-op rather than a
    /// resurrection.
    pub forfeited_players: Vec<PlayerId>,
}

impl GameState {
    pub fn new(id: GameId, config: GameConfig) -> Self {
        GameState {
            id,
            phase: Phase::Lobby,
            config,
            players: Vec::new(),
            pieces: Vec::new(),
            holes: Vec::new(),
            current_player_id: None,
            turn_number: 0,
            round_number: 0,
            rounds_since_elimination: 0,
            winner_id: None,
            win_condition: None,
            starvation_candidates: None,
            pending_starvation_choices: None,
            disconnected_players: Vec::new(),
            forfeited_players: Vec::new(),
        }
    }

    pub fn piece_at(&self, pos: Axial) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.position == pos)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn is_hole(&self, pos: Axial) -> bool {
        self.holes.contains(&pos)
    }

    pub fn non_eliminated_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_eliminated)
    }

    pub fn jarl_of(&self, player_id: PlayerId) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.kind == PieceType::Jarl && p.player_id == Some(player_id))
    }

    pub fn warriors_of(&self, player_id: PlayerId) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(move |p| p.kind == PieceType::Warrior && p.player_id == Some(player_id))
    }
}
