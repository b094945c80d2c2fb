//! The game manager (§4.E): owns the `gameId -> game actor` registry and
//! the per-game lock that serializes every mutation. This is the only
//! layer that talks to persistence, AI adapters, and the broadcast rooms
//! the realtime transport subscribes to — HTTP/websocket handlers are
//! thin callers of the methods here, per §4.G.

pub mod errors;
pub mod grace;
pub mod notifications;

pub use errors::ManagerError;
pub use notifications::GameNotification;

use ai::{AiAdapter, HeuristicAi, LlmAi};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use game_core::GameMachine;
use grace::GraceTimers;
use hex::Axial;
use persistence::Database;
use rules::{AiConfig, AiKind, GameConfig, GameId, PieceId, Phase, PlayerId};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

const ROOM_CAPACITY: usize = 256;

struct GameEntry {
    machine: GameMachine,
    version: i64,
    created_at: DateTime<Utc>,
}

/// The outcome of a successful `make_move`/`submit_starvation_choice` call
/// — everything the caller needs to ack the request and broadcast to the
/// room (§4.H `playTurn`).
pub struct MoveOutcome {
    pub events: Vec<rules::GameEvent>,
    pub state: rules::GameState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: GameId,
    pub status: String,
    pub player_count: usize,
    pub max_players: u8,
    pub turn_timer_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_games: usize,
    pub open_lobbies: usize,
    pub games_in_progress: usize,
    pub games_ended: usize,
}

pub struct GameManager {
    registry: DashMap<GameId, Arc<Mutex<GameEntry>>>,
    rooms: DashMap<GameId, broadcast::Sender<GameNotification>>,
    db: Arc<dyn Database>,
    ai_adapters: DashMap<PlayerId, Arc<dyn AiAdapter>>,
    grace: GraceTimers,
    grace_period: Duration,
    ai_timeout: Duration,
}

impl GameManager {
    /// `grace_period` is the §4.E disconnect-forfeit grace timer (spec
    /// default ~120s); `ai_timeout` is the §5 AI adapter invocation
    /// timeout. Returned as an `Arc` because grace timers and AI turns are
    /// spawned tasks that need to re-enter the manager after this call
    /// returns.
    pub fn new(db: Arc<dyn Database>, grace_period: Duration, ai_timeout: Duration) -> Arc<Self> {
        Arc::new(GameManager {
            registry: DashMap::new(),
            rooms: DashMap::new(),
            db,
            ai_adapters: DashMap::new(),
            grace: GraceTimers::new(),
            grace_period,
            ai_timeout,
        })
    }

    fn room_sender(&self, game_id: GameId) -> broadcast::Sender<GameNotification> {
        self.rooms.entry(game_id).or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0).clone()
    }

    /// Subscribes a transport-layer connection to a game's room (§4.H "the
    /// socket joins the Manager's per-game room").
    pub fn subscribe(&self, game_id: GameId) -> broadcast::Receiver<GameNotification> {
        self.room_sender(game_id).subscribe()
    }

    fn broadcast(&self, game_id: GameId, notification: GameNotification) {
        // No receivers is not an error — a room can be briefly empty.
        let _ = self.room_sender(game_id).send(notification);
    }

    /// `create(config) -> gameId` (§4.E).
    pub async fn create(&self, config: GameConfig) -> Result<GameId, ManagerError> {
        let id = Uuid::new_v4();
        let machine = GameMachine::new(id, config);
        self.db.save_snapshot(id, &machine.state, 1, Phase::Lobby).await?;
        self.db.save_event(id, "GAME_CREATED", &json!({ "gameId": id })).await;

        self.registry.insert(id, Arc::new(Mutex::new(GameEntry { machine, version: 1, created_at: Utc::now() })));
        self.room_sender(id);
        tracing::info!(game_id = %id, "game created");
        Ok(id)
    }

    fn entry(&self, game_id: GameId) -> Result<Arc<Mutex<GameEntry>>, ManagerError> {
        self.registry.get(&game_id).map(|e| e.value().clone()).ok_or(ManagerError::GameNotFound)
    }

    /// `join(gameId, playerName) -> playerId` (§4.E).
    pub async fn join(&self, game_id: GameId, player_name: String) -> Result<PlayerId, ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        let player_id = guard.machine.join(player_name.clone(), false, None)?;
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        drop(guard);

        self.persist(game_id, &state, version, Phase::Lobby).await;
        self.db.save_event(game_id, "PLAYER_JOINED", &json!({ "playerId": player_id, "name": player_name })).await;
        self.broadcast(game_id, GameNotification::PlayerJoined { player_id, name: player_name });
        Ok(player_id)
    }

    /// `POST /api/games/:id/ai` (§6): joins an AI player and registers its
    /// adapter instance (§4.I).
    pub async fn add_ai_player(&self, game_id: GameId, ai_config: AiConfig) -> Result<PlayerId, ManagerError> {
        let entry = self.entry(game_id)?;
        let name = format!("AI ({:?})", ai_config.kind);
        let mut guard = entry.lock().await;
        let player_id = guard.machine.join(name, true, Some(ai_config.clone()))?;
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        drop(guard);

        let adapter: Arc<dyn AiAdapter> = match ai_config.kind {
            AiKind::Heuristic => Arc::new(HeuristicAi::new(rand::random())),
            AiKind::Llm => Arc::new(LlmAi { model: ai_config.model.clone().unwrap_or_default(), custom_prompt: ai_config.custom_prompt.clone() }),
        };
        self.ai_adapters.insert(player_id, adapter);

        self.persist(game_id, &state, version, Phase::Lobby).await;
        self.db.save_event(game_id, "PLAYER_JOINED", &json!({ "playerId": player_id, "ai": true })).await;
        Ok(player_id)
    }

    /// `start(gameId, callerPlayerId)` (§4.E).
    pub async fn start(self: &Arc<Self>, game_id: GameId, caller: PlayerId) -> Result<(), ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        guard.machine.start(caller, rand::random())?;
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        drop(guard);

        self.persist(game_id, &state, version, Phase::Playing).await;
        self.db.save_event(game_id, "GAME_STARTED", &json!({})).await;
        self.broadcast(game_id, GameNotification::GameState { state });
        self.maybe_run_ai_turn(game_id);
        Ok(())
    }

    /// `makeMove(gameId, playerId, command, clientTurnNumber?)` (§4.E).
    pub async fn make_move(
        self: &Arc<Self>,
        game_id: GameId,
        player_id: PlayerId,
        piece_id: PieceId,
        destination: Axial,
        client_turn_number: Option<u64>,
    ) -> Result<MoveOutcome, ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        let events = guard.machine.play_turn(player_id, piece_id, destination, client_turn_number)?;
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        let status = state.phase;
        drop(guard);

        self.persist(game_id, &state, version, status).await;
        for event in &events {
            self.db.save_event(game_id, event_type_tag(event), &serde_json::to_value(event).expect("GameEvent serializes")).await;
        }

        self.broadcast(game_id, GameNotification::TurnPlayed { state: state.clone(), events: events.clone() });
        if let Some(rules::GameEvent::GameEnded { winner_id, win_condition }) = events.iter().find(|e| matches!(e, rules::GameEvent::GameEnded { .. })) {
            self.broadcast(game_id, GameNotification::GameEnded { winner_id: *winner_id, win_condition: *win_condition });
        }
        if status == Phase::Starvation {
            if let Some(candidates) = state.starvation_candidates.clone() {
                self.broadcast(game_id, GameNotification::StarvationRequired { candidates });
            }
        }

        self.maybe_run_ai_turn(game_id);
        Ok(MoveOutcome { events, state })
    }

    /// `submitStarvationChoice(gameId, playerId, pieceId)` (§4.E).
    pub async fn submit_starvation_choice(self: &Arc<Self>, game_id: GameId, player_id: PlayerId, piece_id: PieceId) -> Result<MoveOutcome, ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        let events = guard.machine.submit_starvation_choice(player_id, piece_id)?;
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        let status = state.phase;
        drop(guard);

        self.persist(game_id, &state, version, status).await;
        for event in &events {
            self.db.save_event(game_id, event_type_tag(event), &serde_json::to_value(event).expect("GameEvent serializes")).await;
        }

        if !events.is_empty() {
            self.broadcast(game_id, GameNotification::GameState { state: state.clone() });
        }
        if let Some(rules::GameEvent::GameEnded { winner_id, win_condition }) = events.iter().find(|e| matches!(e, rules::GameEvent::GameEnded { .. })) {
            self.broadcast(game_id, GameNotification::GameEnded { winner_id: *winner_id, win_condition: *win_condition });
        }

        self.maybe_run_ai_turn(game_id);
        Ok(MoveOutcome { events, state })
    }

    /// `onDisconnect(gameId, playerId)` (§4.E): pauses the game and arms
    /// the grace timer; on expiry the player is forfeited.
    pub async fn on_disconnect(self: &Arc<Self>, game_id: GameId, player_id: PlayerId) -> Result<(), ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        let paused = guard.machine.disconnect(player_id);
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        drop(guard);

        self.persist(game_id, &state, version, state.phase).await;
        if paused {
            self.broadcast(game_id, GameNotification::PlayerLeft { player_id });
        }

        let manager = self.clone();
        let grace_period = self.grace_period;
        let join_handle = tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            manager.forfeit(game_id, player_id).await;
        });
        self.grace.arm(game_id, player_id, join_handle.abort_handle());
        Ok(())
    }

    /// `onReconnect(gameId, playerId)` (§4.E): a no-op unless `player_id`
    /// is actually in `disconnected_players` — an ordinary join or an
    /// already-connected player re-sending auth must not broadcast a
    /// bogus `playerReconnected`. Otherwise cancels the grace timer and
    /// unpauses the game if every disconnected player is back.
    pub async fn on_reconnect(self: &Arc<Self>, game_id: GameId, player_id: PlayerId) -> Result<(), ManagerError> {
        let entry = self.entry(game_id)?;
        let mut guard = entry.lock().await;
        if !guard.machine.state.disconnected_players.contains(&player_id) {
            return Ok(());
        }

        self.grace.cancel(game_id, player_id);
        let resumed = guard.machine.reconnect(player_id);
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        drop(guard);

        self.persist(game_id, &state, version, state.phase).await;
        self.broadcast(game_id, GameNotification::PlayerReconnected { player_id });
        if resumed {
            self.broadcast(game_id, GameNotification::GameState { state });
            self.maybe_run_ai_turn(game_id);
        }
        Ok(())
    }

    async fn forfeit(self: &Arc<Self>, game_id: GameId, player_id: PlayerId) {
        self.grace.clear_fired(game_id, player_id);
        let Ok(entry) = self.entry(game_id) else { return };
        let mut guard = entry.lock().await;
        let events = guard.machine.forfeit(player_id);
        guard.version += 1;
        let version = guard.version;
        let state = guard.machine.state.clone();
        let status = state.phase;
        drop(guard);

        tracing::info!(game_id = %game_id, player_id = %player_id, "player forfeited after grace timer expiry");
        self.persist(game_id, &state, version, status).await;
        self.broadcast(game_id, GameNotification::GameState { state: state.clone() });
        if let Some(rules::GameEvent::GameEnded { winner_id, win_condition }) = events.iter().find(|e| matches!(e, rules::GameEvent::GameEnded { .. })) {
            self.broadcast(game_id, GameNotification::GameEnded { winner_id: *winner_id, win_condition: *win_condition });
        }
        self.maybe_run_ai_turn(game_id);
    }

    /// If the current player is AI, spawns a task that asks its adapter
    /// for a move (with the §5 timeout) and feeds it through `make_move`.
    /// On timeout or adapter error, falls back to a deterministic forced
    /// move (first legal move for the player's first piece with one) — the
    /// "forced move" policy named as an implementation choice in §5/§9.
    fn maybe_run_ai_turn(self: &Arc<Self>, game_id: GameId) {
        let manager = self.clone();
        tokio::spawn(async move {
            let Ok(entry) = manager.entry(game_id) else { return };
            let (phase, player_id, state) = {
                let guard = entry.lock().await;
                (guard.machine.state.phase, guard.machine.state.current_player_id, guard.machine.state.clone())
            };

            if phase == Phase::Starvation {
                manager.run_ai_starvation_choices(game_id, &state).await;
                return;
            }

            let Some(player_id) = player_id else { return };
            if phase != Phase::Playing || !manager.is_ai_player(&state, player_id) {
                return;
            }
            let Some(adapter) = manager.ai_adapters.get(&player_id).map(|a| a.value().clone()) else { return };

            let command = match ai::generate_move_with_timeout(adapter.as_ref(), &state, player_id, manager.ai_timeout).await {
                Ok(command) => Some(command),
                Err(err) => {
                    tracing::warn!(game_id = %game_id, player_id = %player_id, error = %err, "AI adapter failed, falling back to forced move");
                    forced_move(&state, player_id)
                }
            };
            let Some(command) = command else {
                tracing::error!(game_id = %game_id, player_id = %player_id, "AI player has no legal move; game is stalled pending intervention");
                return;
            };

            if let Err(err) = manager.make_move(game_id, player_id, command.piece_id, command.destination, None).await {
                tracing::error!(game_id = %game_id, player_id = %player_id, error = %err, "AI-generated move was rejected");
            }
        });
    }

    fn is_ai_player(&self, state: &rules::GameState, player_id: PlayerId) -> bool {
        state.players.iter().find(|p| p.id == player_id).map(|p| p.is_ai).unwrap_or(false)
    }

    /// Submits a starvation choice on behalf of every AI player with
    /// pending candidates who has not yet chosen (§4.I's optional
    /// `generateStarvationChoice`, with the adapter's own deterministic
    /// default — lowest candidate id — if it declines to choose).
    async fn run_ai_starvation_choices(self: &Arc<Self>, game_id: GameId, state: &rules::GameState) {
        let Some(candidates) = state.starvation_candidates.clone() else { return };
        let pending = state.pending_starvation_choices.clone().unwrap_or_default();

        for candidate in candidates {
            if !self.is_ai_player(state, candidate.player_id) {
                continue;
            }
            if pending.iter().any(|(p, _)| *p == candidate.player_id) {
                continue;
            }
            let Some(adapter) = self.ai_adapters.get(&candidate.player_id).map(|a| a.value().clone()) else { continue };
            let piece_id = match adapter.generate_starvation_choice(state, candidate.player_id).await {
                Some(id) => id,
                None => candidate.candidate_piece_ids[0],
            };
            if let Err(err) = self.submit_starvation_choice(game_id, candidate.player_id, piece_id).await {
                tracing::error!(game_id = %game_id, player_id = %candidate.player_id, error = %err, "AI starvation choice was rejected");
            }
        }
    }

    /// `recover()` (§4.E): re-hydrates one actor per non-terminal snapshot
    /// at process start. AI adapters are reconstructed from each player's
    /// stored `aiConfig` since adapter instances themselves are not
    /// persisted (see DESIGN.md).
    pub async fn recover(self: &Arc<Self>) -> Result<usize, ManagerError> {
        let snapshots = self.db.load_active_snapshots().await?;
        let count = snapshots.len();
        for snapshot in snapshots {
            let game_id = snapshot.game_id;
            for player in &snapshot.state.players {
                if let (true, Some(ai_config)) = (player.is_ai, player.ai_config.clone()) {
                    let adapter: Arc<dyn AiAdapter> = match ai_config.kind {
                        AiKind::Heuristic => Arc::new(HeuristicAi::new(rand::random())),
                        AiKind::Llm => Arc::new(LlmAi { model: ai_config.model.clone().unwrap_or_default(), custom_prompt: ai_config.custom_prompt.clone() }),
                    };
                    self.ai_adapters.insert(player.id, adapter);
                }
            }

            let version = snapshot.version;
            let machine = GameMachine::from_state(snapshot.state);
            self.registry.insert(game_id, Arc::new(Mutex::new(GameEntry { machine, version, created_at: snapshot.created_at })));
            self.room_sender(game_id);
            self.maybe_run_ai_turn(game_id);
        }
        tracing::info!(recovered = count, "recovered active games from persistence");
        Ok(count)
    }

    pub async fn state_of(&self, game_id: GameId) -> Result<rules::GameState, ManagerError> {
        let entry = self.entry(game_id)?;
        let guard = entry.lock().await;
        Ok(guard.machine.state.clone())
    }

    pub async fn valid_moves(&self, game_id: GameId, piece_id: PieceId) -> Result<Vec<rules::ValidMove>, ManagerError> {
        let entry = self.entry(game_id)?;
        let guard = entry.lock().await;
        Ok(rules::valid_moves(&guard.machine.state, piece_id))
    }

    pub async fn list_games(&self) -> Vec<GameSummary> {
        let mut out = Vec::with_capacity(self.registry.len());
        for entry in self.registry.iter() {
            let guard = entry.value().lock().await;
            let state = &guard.machine.state;
            out.push(GameSummary {
                game_id: *entry.key(),
                status: phase_str(state.phase).to_string(),
                player_count: state.players.len(),
                max_players: state.config.player_count,
                turn_timer_ms: state.config.turn_timer_ms,
                created_at: guard.created_at,
                players: state.players.iter().map(|p| PlayerSummary { id: p.id, name: p.name.clone() }).collect(),
            });
        }
        out
    }

    pub async fn stats(&self) -> GameStats {
        let mut stats = GameStats::default();
        for entry in self.registry.iter() {
            let guard = entry.value().lock().await;
            stats.total_games += 1;
            match guard.machine.state.phase {
                Phase::Lobby => stats.open_lobbies += 1,
                Phase::Playing | Phase::Starvation | Phase::Paused => stats.games_in_progress += 1,
                Phase::Ended => stats.games_ended += 1,
            }
        }
        stats
    }

    async fn persist(&self, game_id: GameId, state: &rules::GameState, version: i64, status: Phase) {
        if let Err(err) = self.db.save_snapshot(game_id, state, version, status).await {
            tracing::error!(game_id = %game_id, error = %err, "failed to persist snapshot");
        }
    }
}

fn event_type_tag(event: &rules::GameEvent) -> &'static str {
    match event {
        rules::GameEvent::Move { .. } => "MOVE",
        rules::GameEvent::Push { .. } => "PUSH",
        rules::GameEvent::Eliminated { .. } => "ELIMINATED",
        rules::GameEvent::GameEnded { .. } => "GAME_ENDED",
    }
}

fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Lobby => "lobby",
        Phase::Playing => "playing",
        Phase::Starvation => "starvation",
        Phase::Paused => "paused",
        Phase::Ended => "ended",
    }
}

fn forced_move(state: &rules::GameState, player_id: PlayerId) -> Option<ai::MoveCommand> {
    state
        .pieces
        .iter()
        .filter(|p| p.player_id == Some(player_id))
        .find_map(|piece| rules::valid_moves(state, piece.id).into_iter().next().map(|m| ai::MoveCommand { piece_id: piece.id, destination: m.to }))
}
