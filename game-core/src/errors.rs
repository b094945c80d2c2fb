//! Transition-rejection kinds for the game state machine (§4.C). These sit
//! one layer above [`rules::ValidationError`] — they cover the lobby/
//! disconnect/starvation transitions the rules engine itself knows nothing
//! about.

use rules::{StarvationChoiceError, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("the game has already started")]
    NotInLobby,
    #[error("the game is full")]
    GameFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("the game has already started")]
    NotInLobby,
    #[error("only the host can start the game")]
    NotHost,
    #[error("at least 2 players must join before starting")]
    NotEnoughPlayers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("stale move request")]
    StaleTurn,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StarvationTurnError {
    #[error("the game is not awaiting starvation choices")]
    NotAwaitingStarvation,
    #[error(transparent)]
    Choice(#[from] StarvationChoiceError),
}
