//! Broadcast payloads fanned out to a game's room (§4.H Server → Client
//! messages). The manager owns one `broadcast::Sender` per game, the same
//! shape as the teacher's `Room::host_to_client_broadcaster` — the
//! transport layer only ever subscribes and forwards, it never mutates
//! game state itself.

use rules::{GameEvent, GameState, PlayerId, StarvationCandidates, WinCondition};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameNotification {
    #[serde(rename = "gameState")]
    GameState { state: GameState },
    #[serde(rename = "turnPlayed")]
    TurnPlayed { state: GameState, events: Vec<GameEvent> },
    #[serde(rename = "gameEnded")]
    GameEnded { winner_id: PlayerId, win_condition: WinCondition },
    #[serde(rename = "playerJoined")]
    PlayerJoined { player_id: PlayerId, name: String },
    #[serde(rename = "playerLeft")]
    PlayerLeft { player_id: PlayerId },
    #[serde(rename = "playerReconnected")]
    PlayerReconnected { player_id: PlayerId },
    #[serde(rename = "starvationRequired")]
    StarvationRequired { candidates: Vec<StarvationCandidates> },
}
