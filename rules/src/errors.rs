//! The validation error enum from §4.B.2, plus the starvation-choice
//! rejection kinds from §4.B.7. These are returned, never logged as server
//! errors — per §7 they are expected, player-facing outcomes.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("game is not in the playing phase")]
    GameNotPlaying,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("piece not found")]
    PieceNotFound,
    #[error("that piece does not belong to you")]
    NotYourPiece,
    #[error("destination is off the board")]
    DestinationOffBoard,
    #[error("destination is a hole")]
    DestinationIsHole,
    #[error("destination is occupied by your own piece")]
    DestinationOccupiedFriendly,
    #[error("a warrior cannot enter the throne")]
    WarriorCannotEnterThrone,
    #[error("move is not a straight line")]
    MoveNotStraightLine,
    #[error("a warrior may only move 1 or 2 hexes")]
    InvalidDistanceWarrior,
    #[error("a jarl may only move 1 hex, or 2 with a draft formation")]
    InvalidDistanceJarl,
    #[error("a jarl needs a draft formation to move two hexes")]
    JarlNeedsDraftForTwoHex,
    #[error("the path to the destination is blocked")]
    PathBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StarvationChoiceError {
    #[error("that piece is not a valid sacrifice candidate for you")]
    NotACandidate,
    #[error("you have already submitted a starvation choice this round")]
    AlreadyChosen,
    #[error("the game is not awaiting starvation choices")]
    NotAwaitingStarvation,
    #[error("you are not a player with pending candidates")]
    NoCandidatesForPlayer,
}
