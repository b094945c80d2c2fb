//! Snapshot + event-log persistence (§4.D): a `Database` trait plus a
//! SQLite-backed implementation. The optimistic-locking contract lives
//! here, not in the manager — callers only ever see `VersionConflict` as a
//! flat error, never a row count to interpret themselves.

pub mod errors;
pub mod sqlite;

pub use errors::StoreError;
pub use sqlite::SqliteDatabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rules::{GameId, GameState, Phase};
use serde::{Deserialize, Serialize};

/// A stored snapshot row (§4.D `game_snapshots`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub state: GameState,
    pub version: i64,
    pub status: Phase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The persistence contract (§4.D). Implementations must make
/// `save_snapshot`'s version check atomic — two concurrent callers racing
/// on the same `game_id` must not both succeed.
#[async_trait]
pub trait Database: Send + Sync {
    async fn save_snapshot(&self, game_id: GameId, state: &GameState, expected_version: i64, status: Phase) -> Result<(), StoreError>;

    async fn load_snapshot(&self, game_id: GameId) -> Result<Option<GameSnapshot>, StoreError>;

    /// Appends one event row. `event_type` is a free-form tag (a
    /// `rules::GameEvent` variant name, or a manager lifecycle tag like
    /// `GAME_CREATED`/`PLAYER_JOINED` that the rules engine itself never
    /// produces). Never fails the caller's move — errors are logged by the
    /// implementation, not propagated, per §4.D.
    async fn save_event(&self, game_id: GameId, event_type: &str, event_data: &serde_json::Value);

    /// All snapshots with `status` in `{lobby, playing, starvation, paused}`
    /// — `ended` games are never rehydrated at boot.
    async fn load_active_snapshots(&self) -> Result<Vec<GameSnapshot>, StoreError>;
}

pub(crate) fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Lobby => "lobby",
        Phase::Playing => "playing",
        Phase::Starvation => "starvation",
        Phase::Paused => "paused",
        Phase::Ended => "ended",
    }
}
