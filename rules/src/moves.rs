//! Legal-move enumeration and move validation (§4.B.1, §4.B.2).

use crate::combat::{simulate_attack, AttackSimulation, CombatPreview};
use crate::errors::ValidationError;
use crate::model::{GameState, PieceId, PieceType, Phase, PlayerId};
use hex::{Axial, Dir};

/// Whether a jarl at `jarl_pos` owned by `player_id` has a draft formation
/// in direction `dir` — at least two friendly warriors in an unbroken
/// line (gaps allowed) walking opposite `dir` from the jarl (§4.B.1).
pub fn draft_formation_exists(state: &GameState, player_id: PlayerId, jarl_pos: Axial, dir: Dir) -> bool {
    let behind = hex::opposite_dir(dir);
    let radius = state.config.board_radius;
    let mut cur = jarl_pos;
    let mut count = 0;
    loop {
        cur = hex::neighbor(cur, behind);
        if !hex::is_on_board(cur, radius) {
            break;
        }
        match state.piece_at(cur) {
            None => continue, // gap, walk keeps going
            Some(p) if p.kind == PieceType::Warrior && p.player_id == Some(player_id) => {
                count += 1;
            }
            Some(_) => break, // enemy piece or own jarl terminates the walk
        }
    }
    count >= 2
}

/// The outcome of resolving a single `(pieceId, destination)` command
/// against the board, beyond plain pass/fail — the caller needs to know
/// whether this was a move into empty space or an attack, and (for
/// attacks) the combat preview.
pub enum MoveKind {
    Move,
    Attack(AttackSimulation),
}

pub struct ValidatedMove {
    pub has_momentum: bool,
    /// Set only when a jarl's two-hex path crossed the Throne and the
    /// destination was clamped to it (§4.B.1 step 6).
    pub adjusted_destination: Option<Axial>,
    pub kind: MoveKind,
}

/// Validates `(piece_id, destination)` as a move command from `player_id`
/// against `state`, returning the specific [`ValidationError`] kind on
/// failure (§4.B.2).
pub fn validate_move(
    state: &GameState,
    player_id: PlayerId,
    piece_id: PieceId,
    destination: Axial,
) -> Result<ValidatedMove, ValidationError> {
    if !matches!(state.phase, Phase::Playing) {
        return Err(ValidationError::GameNotPlaying);
    }
    if state.current_player_id != Some(player_id) {
        return Err(ValidationError::NotYourTurn);
    }
    let piece = state.piece(piece_id).ok_or(ValidationError::PieceNotFound)?;
    if piece.player_id != Some(player_id) {
        return Err(ValidationError::NotYourPiece);
    }

    let (dir, raw_distance) =
        hex::line_direction(piece.position, destination).ok_or(ValidationError::MoveNotStraightLine)?;

    // Distance legality is checked against the *requested* distance, even
    // when the Throne later clamps the landing hex — a two-hex jarl move
    // still needs a draft formation regardless of where it ends up.
    match piece.kind {
        PieceType::Warrior => {
            if raw_distance != 1 && raw_distance != 2 {
                return Err(ValidationError::InvalidDistanceWarrior);
            }
        }
        PieceType::Jarl => match raw_distance {
            1 => {}
            2 => {
                if !draft_formation_exists(state, player_id, piece.position, dir) {
                    return Err(ValidationError::JarlNeedsDraftForTwoHex);
                }
            }
            _ => return Err(ValidationError::InvalidDistanceJarl),
        },
    }

    let midpoint = hex::neighbor(piece.position, dir);
    let crosses_throne = piece.kind == PieceType::Jarl && raw_distance == 2 && midpoint == Axial::ORIGIN;
    let (effective_destination, effective_distance) =
        if crosses_throne { (Axial::ORIGIN, 1) } else { (destination, raw_distance) };

    let radius = state.config.board_radius;
    if !hex::is_on_board(effective_destination, radius) {
        return Err(ValidationError::DestinationOffBoard);
    }
    if state.is_hole(effective_destination) {
        return Err(ValidationError::DestinationIsHole);
    }
    if let Some(occupant) = state.piece_at(effective_destination) {
        if occupant.player_id == piece.player_id {
            return Err(ValidationError::DestinationOccupiedFriendly);
        }
    }
    if piece.kind == PieceType::Warrior && effective_destination == Axial::ORIGIN {
        return Err(ValidationError::WarriorCannotEnterThrone);
    }

    if !crosses_throne && effective_distance == 2 {
        let mid = hex::neighbor(piece.position, dir);
        if state.piece_at(mid).is_some() || state.is_hole(mid) {
            return Err(ValidationError::PathBlocked);
        }
    }

    let has_momentum = raw_distance == 2;

    let kind = if let Some(occupant) = state.piece_at(effective_destination) {
        debug_assert_ne!(occupant.player_id, piece.player_id);
        MoveKind::Attack(simulate_attack(state, piece.position, effective_destination, dir, has_momentum))
    } else {
        MoveKind::Move
    };

    if let MoveKind::Attack(ref sim) = kind {
        if !sim.legal {
            // A blocked (or compressed) attack is not a legal move at
            // all, per §4.B.1 step 4 and §4.B.5 — there is no dedicated
            // error kind for this in §4.B.2's literal list, so the
            // engine reports it as a blocked path (closest existing
            // kind in spirit; see DESIGN.md).
            return Err(ValidationError::PathBlocked);
        }
    }

    Ok(ValidatedMove {
        has_momentum,
        adjusted_destination: if crosses_throne { Some(Axial::ORIGIN) } else { None },
        kind,
    })
}

/// A single entry in the enumerated legal-move list for a piece (§4.B.1).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidMove {
    pub to: Axial,
    pub has_momentum: bool,
    pub is_attack: bool,
    pub combat_preview: Option<CombatPreview>,
}

/// Enumerates every legal destination for `piece_id`, independent of whose
/// turn it is — a pure function of `(state, piece_id)` (§8 invariant 6).
/// Turn ownership is enforced separately by [`validate_move`].
pub fn valid_moves(state: &GameState, piece_id: PieceId) -> Vec<ValidMove> {
    let Some(piece) = state.piece(piece_id) else {
        return Vec::new();
    };
    let Some(player_id) = piece.player_id else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for dir in 0..6u8 {
        let distances: Vec<i32> = match piece.kind {
            PieceType::Warrior => vec![1, 2],
            PieceType::Jarl => {
                if draft_formation_exists(state, player_id, piece.position, dir) {
                    vec![1, 2]
                } else {
                    vec![1]
                }
            }
        };

        for distance in distances {
            let midpoint = hex::neighbor(piece.position, dir);
            let crosses_throne = piece.kind == PieceType::Jarl && distance == 2 && midpoint == Axial::ORIGIN;
            let destination = if crosses_throne {
                Axial::ORIGIN
            } else {
                let mut h = piece.position;
                for _ in 0..distance {
                    h = hex::neighbor(h, dir);
                }
                h
            };

            let radius = state.config.board_radius;
            if !hex::is_on_board(destination, radius) {
                continue;
            }
            if state.is_hole(destination) {
                continue;
            }
            if piece.kind == PieceType::Warrior && destination == Axial::ORIGIN {
                continue;
            }
            if !crosses_throne && distance == 2 {
                let mid = hex::neighbor(piece.position, dir);
                if state.piece_at(mid).is_some() || state.is_hole(mid) {
                    continue;
                }
            }

            let has_momentum = distance == 2;

            match state.piece_at(destination) {
                None => out.push(ValidMove { to: destination, has_momentum, is_attack: false, combat_preview: None }),
                Some(occupant) if occupant.player_id == Some(player_id) => continue,
                Some(_) => {
                    let sim = simulate_attack(state, piece.position, destination, dir, has_momentum);
                    if sim.legal {
                        out.push(ValidMove {
                            to: destination,
                            has_momentum,
                            is_attack: true,
                            combat_preview: Some(sim.preview),
                        });
                    }
                }
            }
        }
    }
    out
}
