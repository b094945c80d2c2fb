//! `ApiError` (SPEC_FULL.md §B): maps manager/session failures onto the
//! `{error: CODE, message}` wire contract from §6. `UNAUTHORIZED` is the
//! single code for every auth failure, per §6's explicit instruction.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use manager::ManagerError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound,
    Validation(rules::ValidationError),
    StaleTurn,
    BadRequest(String),
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication failed".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "GAME_NOT_FOUND", "game not found".to_string()),
            ApiError::Validation(v) => (StatusCode::BAD_REQUEST, validation_code(v), v.to_string()),
            ApiError::StaleTurn => (StatusCode::CONFLICT, "STALE_TURN", "Stale move request".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "internal server error".to_string()),
        };
        (status, Json(ErrorBody { error: code.to_string(), message })).into_response()
    }
}

fn validation_code(err: &rules::ValidationError) -> &'static str {
    use rules::ValidationError::*;
    match err {
        GameNotPlaying => "GAME_NOT_PLAYING",
        NotYourTurn => "NOT_YOUR_TURN",
        PieceNotFound => "PIECE_NOT_FOUND",
        NotYourPiece => "NOT_YOUR_PIECE",
        DestinationOffBoard => "DESTINATION_OFF_BOARD",
        DestinationIsHole => "DESTINATION_IS_HOLE",
        DestinationOccupiedFriendly => "DESTINATION_OCCUPIED_FRIENDLY",
        WarriorCannotEnterThrone => "WARRIOR_CANNOT_ENTER_THRONE",
        MoveNotStraightLine => "MOVE_NOT_STRAIGHT_LINE",
        InvalidDistanceWarrior => "INVALID_DISTANCE_WARRIOR",
        InvalidDistanceJarl => "INVALID_DISTANCE_JARL",
        JarlNeedsDraftForTwoHex => "JARL_NEEDS_DRAFT_FOR_TWO_HEX",
        PathBlocked => "PATH_BLOCKED",
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::GameNotFound => ApiError::NotFound,
            ManagerError::StaleTurn => ApiError::StaleTurn,
            ManagerError::Unauthorized => ApiError::Unauthorized,
            ManagerError::Join(e) => ApiError::BadRequest(e.to_string()),
            ManagerError::Start(e) => ApiError::BadRequest(e.to_string()),
            ManagerError::Validation(v) => ApiError::Validation(v),
            ManagerError::Starvation(e) => ApiError::BadRequest(e.to_string()),
            ManagerError::Store(e) => {
                tracing::error!(error = %e, "persistence error surfaced to API layer");
                ApiError::Internal
            }
        }
    }
}
