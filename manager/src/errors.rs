//! `manager::ManagerError` (SPEC_FULL.md §B): the single error surface the
//! HTTP/realtime layers translate into wire responses.

use game_core::{JoinError, StarvationTurnError, StartError, TurnError};
use persistence::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("game not found")]
    GameNotFound,
    #[error("stale move request")]
    StaleTurn,
    #[error("not authorized to perform this action")]
    Unauthorized,
    #[error("{0}")]
    Join(#[from] JoinError),
    #[error("{0}")]
    Start(#[from] StartError),
    #[error("{0}")]
    Validation(#[from] rules::ValidationError),
    #[error("{0}")]
    Starvation(#[from] StarvationTurnError),
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

impl From<TurnError> for ManagerError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::StaleTurn => ManagerError::StaleTurn,
            TurnError::Validation(v) => ManagerError::Validation(v),
        }
    }
}
