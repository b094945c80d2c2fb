//! REST endpoints from §6: lobby management and turn-taking over plain
//! request/response, with Bearer session tokens for anything scoped to a
//! specific game/player. The realtime transport in `ws.rs` is the other
//! half of §4.H; this module covers everything that doesn't need a
//! persistent connection.

use crate::errors::ApiError;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use manager::{GameManager, GameStats, GameSummary};
use rules::{AiConfig, GameConfig, PieceId, PlayerId};
use serde::{Deserialize, Serialize};
use session::{SessionData, SessionStore};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<GameManager>,
    pub sessions: Arc<SessionStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", post(create_game).get(list_games))
        .route("/api/games/stats", get(stats))
        .route("/api/games/{id}/join", post(join_game))
        .route("/api/games/{id}/ai", post(add_ai_player))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/start", post(start_game))
        .route("/api/games/{id}/valid-moves/{piece_id}", get(valid_moves))
        .with_state(state)
}

/// Extracts and validates the Bearer session token, confirming it belongs
/// to the game named in the path (§6 "the token must match the gameId in
/// the URL"). A single `UNAUTHORIZED` code covers every failure mode.
fn authenticate(headers: &HeaderMap, sessions: &SessionStore, game_id: Uuid) -> Result<SessionData, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let data = sessions.validate_session(token).ok_or(ApiError::Unauthorized)?;
    if data.game_id != game_id {
        return Err(ApiError::Unauthorized);
    }
    sessions.extend_session(token);
    Ok(data)
}

#[derive(Deserialize)]
struct CreateGameRequest {
    #[serde(flatten)]
    config: GameConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGameResponse {
    game_id: Uuid,
}

async fn create_game(State(state): State<AppState>, Json(req): Json<CreateGameRequest>) -> Result<Json<CreateGameResponse>, ApiError> {
    let game_id = state.manager.create(req.config).await?;
    Ok(Json(CreateGameResponse { game_id }))
}

async fn list_games(State(state): State<AppState>) -> Json<Vec<GameSummary>> {
    Json(state.manager.list_games().await)
}

async fn stats(State(state): State<AppState>) -> Json<GameStats> {
    Json(state.manager.stats().await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest {
    player_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinResponse {
    player_id: PlayerId,
    session_token: String,
}

async fn join_game(State(state): State<AppState>, Path(game_id): Path<Uuid>, Json(req): Json<JoinRequest>) -> Result<Json<JoinResponse>, ApiError> {
    let player_id = state.manager.join(game_id, req.player_name.clone()).await?;
    let token = state.sessions.create_session(game_id, player_id, req.player_name);
    Ok(Json(JoinResponse { player_id, session_token: token }))
}

#[derive(Deserialize)]
struct AddAiRequest {
    #[serde(flatten)]
    ai_config: AiConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddAiResponse {
    ai_player_id: PlayerId,
    ai_config: AiConfig,
}

/// Host-only (§6): the caller's session must belong to the game's host,
/// i.e. the first player to have joined.
async fn add_ai_player(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<AddAiRequest>,
) -> Result<Json<AddAiResponse>, ApiError> {
    let caller = authenticate(&headers, &state.sessions, game_id)?;
    require_host(&state, game_id, caller.player_id).await?;
    let ai_config = req.ai_config;
    let ai_player_id = state.manager.add_ai_player(game_id, ai_config.clone()).await?;
    Ok(Json(AddAiResponse { ai_player_id, ai_config }))
}

async fn get_game(State(state): State<AppState>, Path(game_id): Path<Uuid>, headers: HeaderMap) -> Result<Json<rules::GameState>, ApiError> {
    authenticate(&headers, &state.sessions, game_id)?;
    let game_state = state.manager.state_of(game_id).await?;
    Ok(Json(game_state))
}

async fn start_game(State(state): State<AppState>, Path(game_id): Path<Uuid>, headers: HeaderMap) -> Result<(), ApiError> {
    let caller = authenticate(&headers, &state.sessions, game_id)?;
    state.manager.start(game_id, caller.player_id).await?;
    Ok(())
}

async fn valid_moves(
    State(state): State<AppState>,
    Path((game_id, piece_id)): Path<(Uuid, PieceId)>,
    headers: HeaderMap,
) -> Result<Json<Vec<rules::ValidMove>>, ApiError> {
    authenticate(&headers, &state.sessions, game_id)?;
    let moves = state.manager.valid_moves(game_id, piece_id).await?;
    Ok(Json(moves))
}

/// The host is whichever player occupies seat 0 — the first to join a
/// fresh lobby (§4.E "the creator becomes the first player, i.e. host").
async fn require_host(state: &AppState, game_id: Uuid, caller: PlayerId) -> Result<(), ApiError> {
    let game_state = state.manager.state_of(game_id).await?;
    match game_state.players.first() {
        Some(host) if host.id == caller => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
