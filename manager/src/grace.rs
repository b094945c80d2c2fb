//! Disconnect grace timers (§4.E `onDisconnect`/`onReconnect`). Cancellable
//! `tokio::spawn` handles keyed by `(gameId, playerId)` — the async
//! equivalent of the teacher's frame-polled `Timer`, since there is no
//! per-frame tick to drive here.

use dashmap::DashMap;
use rules::{GameId, PlayerId};
use tokio::task::AbortHandle;

#[derive(Default)]
pub struct GraceTimers {
    handles: DashMap<(GameId, PlayerId), AbortHandle>,
}

impl GraceTimers {
    pub fn new() -> Self {
        GraceTimers::default()
    }

    /// Overwrites any existing timer for this player, matching the
    /// teacher's `start_timer`'s "overwrite on reuse" behavior.
    pub fn arm(&self, game_id: GameId, player_id: PlayerId, handle: AbortHandle) {
        if let Some((_, old)) = self.handles.remove(&(game_id, player_id)) {
            old.abort();
        }
        self.handles.insert((game_id, player_id), handle);
    }

    /// Cancels the timer if still pending. Returns `true` if one was armed.
    pub fn cancel(&self, game_id: GameId, player_id: PlayerId) -> bool {
        if let Some((_, handle)) = self.handles.remove(&(game_id, player_id)) {
            handle.abort();
            true
        } else {
            false
        }
    }

    pub fn clear_fired(&self, game_id: GameId, player_id: PlayerId) {
        self.handles.remove(&(game_id, player_id));
    }
}
