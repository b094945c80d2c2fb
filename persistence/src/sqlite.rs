//! SQLite-backed `Database` (§4.D, §6 Persistence schema). Snapshots and
//! event payloads are stored as opaque JSON blobs — the schema itself does
//! not know the shape of a `GameState` or `GameEvent`.

use crate::errors::StoreError;
use crate::{phase_str, Database, GameSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use rules::{GameId, GameState, Phase};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(database_url).await?;
        let db = SqliteDatabase { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS game_snapshots (
                game_id TEXT PRIMARY KEY,
                state_snapshot TEXT NOT NULL,
                version INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_game_snapshots_status ON game_snapshots(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS game_events (
                event_id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL REFERENCES game_snapshots(game_id) ON DELETE CASCADE,
                event_type TEXT NOT NULL,
                event_data TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_game_events_game_created ON game_events(game_id, created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn save_snapshot(&self, game_id: GameId, state: &GameState, expected_version: i64, status: Phase) -> Result<(), StoreError> {
        let blob = serde_json::to_string(state).expect("GameState always serializes");
        let now = Utc::now();
        let status = phase_str(status);

        if expected_version == 1 {
            sqlx::query(
                "INSERT INTO game_snapshots (game_id, state_snapshot, version, status, created_at, updated_at)
                 VALUES (?, ?, 1, ?, ?, ?)",
            )
            .bind(game_id.to_string())
            .bind(blob)
            .bind(status)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE game_snapshots SET state_snapshot = ?, version = ?, status = ?, updated_at = ?
             WHERE game_id = ? AND version = ?",
        )
        .bind(blob)
        .bind(expected_version)
        .bind(status)
        .bind(now.to_rfc3339())
        .bind(game_id.to_string())
        .bind(expected_version - 1)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict);
        }
        Ok(())
    }

    async fn load_snapshot(&self, game_id: GameId) -> Result<Option<GameSnapshot>, StoreError> {
        let row = sqlx::query(
            "SELECT state_snapshot, version, status, created_at, updated_at FROM game_snapshots WHERE game_id = ?",
        )
        .bind(game_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let state_snapshot: String = row.try_get("state_snapshot")?;
        let state: GameState = serde_json::from_str(&state_snapshot).map_err(|_| StoreError::NotFound)?;
        let version: i64 = row.try_get("version")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Some(GameSnapshot {
            game_id,
            state,
            version,
            status: parse_status(&status),
            created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
            updated_at: updated_at.parse().unwrap_or_else(|_| Utc::now()),
        }))
    }

    async fn save_event(&self, game_id: GameId, event_type: &str, event_data: &serde_json::Value) {
        let data = event_data.to_string();
        let result = sqlx::query(
            "INSERT INTO game_events (game_id, event_type, event_data, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(game_id.to_string())
        .bind(event_type)
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            tracing::error!(%game_id, error = %err, "failed to append game event");
        }
    }

    async fn load_active_snapshots(&self) -> Result<Vec<GameSnapshot>, StoreError> {
        let rows = sqlx::query(
            "SELECT game_id, state_snapshot, version, status, created_at, updated_at FROM game_snapshots
             WHERE status IN ('lobby', 'playing', 'starvation', 'paused')",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let game_id: String = row.try_get("game_id")?;
            let state_snapshot: String = row.try_get("state_snapshot")?;
            let state: GameState = serde_json::from_str(&state_snapshot).map_err(|_| StoreError::NotFound)?;
            let version: i64 = row.try_get("version")?;
            let status: String = row.try_get("status")?;
            let created_at: String = row.try_get("created_at")?;
            let updated_at: String = row.try_get("updated_at")?;
            out.push(GameSnapshot {
                game_id: game_id.parse().map_err(|_| StoreError::NotFound)?,
                state,
                version,
                status: parse_status(&status),
                created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
                updated_at: updated_at.parse().unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(out)
    }
}

fn parse_status(s: &str) -> Phase {
    match s {
        "lobby" => Phase::Lobby,
        "playing" => Phase::Playing,
        "starvation" => Phase::Starvation,
        "paused" => Phase::Paused,
        _ => Phase::Ended,
    }
}
