//! Combat resolution and push-chain propagation (§4.B.3, §4.B.4, §4.B.5).
//!
//! The chain is resolved with a worklist rather than recursion (Design
//! Notes §9) so its length is bounded by board size, not call-stack depth.

use crate::model::{EliminationCause, GameState, PieceId};
use hex::{Axial, Dir};

/// Attack strength: attacker base + momentum + inline support (§4.B.3.1).
pub fn attack_strength(state: &GameState, attacker_pos: Axial, dir: Dir, has_momentum: bool) -> i32 {
    let attacker = state.piece_at(attacker_pos).expect("attacker must occupy attacker_pos");
    let mut total = attacker.kind.strength() + if has_momentum { 1 } else { 0 };
    let mut cur = attacker_pos;
    loop {
        let behind = hex::neighbor(cur, hex::opposite_dir(dir));
        match state.piece_at(behind) {
            Some(p) if p.player_id == attacker.player_id => {
                total += p.kind.strength();
                cur = behind;
            }
            _ => break,
        }
    }
    total
}

/// Defense strength: defender base + bracing support (§4.B.3.2).
pub fn defense_strength(state: &GameState, defender_pos: Axial, dir: Dir) -> i32 {
    let defender = state.piece_at(defender_pos).expect("defender must occupy defender_pos");
    let mut total = defender.kind.strength();
    let mut cur = defender_pos;
    loop {
        let behind = hex::neighbor(cur, dir);
        match state.piece_at(behind) {
            Some(p) if p.player_id == defender.player_id => {
                total += p.kind.strength();
                cur = behind;
            }
            _ => break,
        }
    }
    total
}

/// One displaced piece in a resolved push chain, ordered from the original
/// defender (depth 0) onward.
#[derive(Debug, Clone)]
pub struct ChainStep {
    pub piece_id: PieceId,
    pub from: Axial,
    pub to: Axial,
    pub eliminated: Option<EliminationCause>,
}

#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// The chain hits the Throne and cannot advance (§4.B.5). The whole
    /// attack is blocked — no pieces move, no events fire.
    Compressed,
    Resolved(Vec<ChainStep>),
}

enum Terminal {
    Edge,
    Hole,
    Empty(Axial),
}

/// Simulates the chain of displacements starting with the defender at
/// `defender_pos` being pushed in direction `dir`. Pure: does not mutate
/// `state`.
pub fn simulate_chain(state: &GameState, defender_pos: Axial, dir: Dir) -> ChainOutcome {
    let radius = state.config.board_radius;
    let mut chain_positions = vec![defender_pos];
    let mut cur = defender_pos;
    loop {
        let next = hex::neighbor(cur, dir);
        if !hex::is_on_board(next, radius) {
            return finish_chain(state, chain_positions, dir, Terminal::Edge);
        }
        if state.is_hole(next) {
            return finish_chain(state, chain_positions, dir, Terminal::Hole);
        }
        if next == Axial::ORIGIN {
            // The Throne blocks any piece, warrior or jarl, from being
            // pushed onto it (§9 Design Notes resolves the ambiguity this
            // way; see DESIGN.md).
            return ChainOutcome::Compressed;
        }
        if state.piece_at(next).is_some() {
            chain_positions.push(next);
            cur = next;
            continue;
        }
        return finish_chain(state, chain_positions, dir, Terminal::Empty(next));
    }
}

fn finish_chain(
    state: &GameState,
    chain_positions: Vec<Axial>,
    dir: Dir,
    terminal: Terminal,
) -> ChainOutcome {
    let n = chain_positions.len();
    let mut steps = Vec::with_capacity(n);
    for (i, &from) in chain_positions.iter().enumerate() {
        let piece = state.piece_at(from).expect("chain position must be occupied");
        if i + 1 < n {
            steps.push(ChainStep { piece_id: piece.id, from, to: chain_positions[i + 1], eliminated: None });
        } else {
            match terminal {
                Terminal::Empty(dest) => {
                    steps.push(ChainStep { piece_id: piece.id, from, to: dest, eliminated: None })
                }
                Terminal::Edge => steps.push(ChainStep {
                    piece_id: piece.id,
                    from,
                    to: hex::neighbor(from, dir),
                    eliminated: Some(EliminationCause::Edge),
                }),
                Terminal::Hole => steps.push(ChainStep {
                    piece_id: piece.id,
                    from,
                    to: hex::neighbor(from, dir),
                    eliminated: Some(EliminationCause::Hole),
                }),
            }
        }
    }
    ChainOutcome::Resolved(steps)
}

/// A preview of an attack's strength comparison, attached to enumerated
/// legal attacks (§4.B.1 step 5).
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatPreview {
    pub attack_strength: i32,
    pub defense_strength: i32,
}

/// Full simulation of an attack: strength comparison plus chain
/// resolution. `legal` is `true` only when the attack both wins the
/// strength comparison and does not compress against the Throne — the
/// combined condition that §4.B.1/§4.B.5 require for an attack to be
/// enumerable as a legal move at all.
pub struct AttackSimulation {
    pub preview: CombatPreview,
    pub legal: bool,
    pub chain: Option<Vec<ChainStep>>,
}

pub fn simulate_attack(state: &GameState, attacker_pos: Axial, defender_pos: Axial, dir: Dir, has_momentum: bool) -> AttackSimulation {
    let preview = CombatPreview {
        attack_strength: attack_strength(state, attacker_pos, dir, has_momentum),
        defense_strength: defense_strength(state, defender_pos, dir),
    };
    if preview.attack_strength <= preview.defense_strength {
        return AttackSimulation { preview, legal: false, chain: None };
    }
    match simulate_chain(state, defender_pos, dir) {
        ChainOutcome::Compressed => AttackSimulation { preview, legal: false, chain: None },
        ChainOutcome::Resolved(steps) => AttackSimulation { preview, legal: true, chain: Some(steps) },
    }
}
