//! Session token issuance/validation/TTL (§4.F). The spec calls for a
//! "low-latency key-value store" with `set-with-ttl`/`get`/`expire`/
//! `delete` semantics; this implementation backs that contract with an
//! in-process `DashMap` rather than an external Redis, and runs a
//! watchdog sweep task to evict expired entries in the background — the
//! same periodic-cleanup shape the teacher uses for dead rooms, just
//! driven by TTL instead of a closed channel.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use rules::{GameId, PlayerId};
use std::sync::Arc;
use std::time::Duration;

const SESSION_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct SessionData {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub player_name: String,
}

struct Entry {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

/// Keyed `session:{token}` conceptually (§6 Session store); the `session:`
/// prefix is an external-store naming convention this in-process map has
/// no need for, so keys here are bare tokens.
#[derive(Default)]
pub struct SessionStore {
    entries: DashMap<String, Entry>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(SessionStore { entries: DashMap::new() })
    }

    /// `createSession`: 256 bits of entropy, hex-encoded (64 chars).
    pub fn create_session(&self, game_id: GameId, player_id: PlayerId, player_name: String) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex_encode::encode(bytes);

        self.entries.insert(
            token.clone(),
            Entry {
                data: SessionData { game_id, player_id, player_name },
                expires_at: Utc::now() + ChronoDuration::seconds(SESSION_TTL_SECS),
            },
        );
        token
    }

    /// `validateSession`: O(1) lookup; `None` for missing or expired.
    pub fn validate_session(&self, token: &str) -> Option<SessionData> {
        let entry = self.entries.get(token)?;
        if entry.expires_at < Utc::now() {
            drop(entry);
            self.entries.remove(token);
            return None;
        }
        Some(entry.data.clone())
    }

    /// `extendSession`: refreshes TTL to 24h on every successful
    /// authenticated operation.
    pub fn extend_session(&self, token: &str) {
        if let Some(mut entry) = self.entries.get_mut(token) {
            entry.expires_at = Utc::now() + ChronoDuration::seconds(SESSION_TTL_SECS);
        }
    }

    /// `invalidateSession`: explicit delete.
    pub fn invalidate_session(&self, token: &str) {
        self.entries.remove(token);
    }

    fn sweep_expired(&self) {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at >= now);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!(removed, "swept expired sessions");
        }
    }
}

/// Spawns the background TTL sweep, mirroring the teacher's
/// `cleanup_dead_rooms` watchdog — a fallback for entries that are never
/// touched again rather than the primary expiry mechanism (lookups expire
/// lazily on their own).
pub fn spawn_sweeper(store: Arc<SessionStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.sweep_expired();
        }
    });
}

mod hex_encode {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: [u8; 32]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            out.push(HEX_CHARS[(b >> 4) as usize] as char);
            out.push(HEX_CHARS[(b & 0x0f) as usize] as char);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn created_session_validates_and_round_trips_data() {
        let store = SessionStore::new();
        let game_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();
        let token = store.create_session(game_id, player_id, "Alice".into());

        assert_eq!(token.len(), 64);
        let data = store.validate_session(&token).expect("session present");
        assert_eq!(data.game_id, game_id);
        assert_eq!(data.player_id, player_id);
        assert_eq!(data.player_name, "Alice");
    }

    #[test]
    fn invalidated_session_no_longer_validates() {
        let store = SessionStore::new();
        let token = store.create_session(Uuid::new_v4(), Uuid::new_v4(), "Bob".into());
        store.invalidate_session(&token);
        assert!(store.validate_session(&token).is_none());
    }

    #[test]
    fn unknown_token_does_not_validate() {
        let store = SessionStore::new();
        assert!(store.validate_session("not-a-real-token").is_none());
    }
}
