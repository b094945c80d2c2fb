//! Board population at game start (§3 Lifecycle): initial piece layout and
//! hole generation. Hole placement is the one place in the engine that
//! uses randomness, and it is always explicitly seeded (§4.B preamble) so
//! that a recovered game reproduces identically if ever replayed from its
//! creation seed.

use crate::model::{GameState, Piece, PieceType};
use hex::Axial;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashSet;
use uuid::Uuid;

fn ring(h: Axial) -> i32 {
    let c = hex::axial_to_cube(h);
    c.q.abs().max(c.r.abs()).max(c.s.abs())
}

/// Places jarls and warriors symmetrically about the board center. Jarls
/// go on the edge, spaced evenly among the six hex directions; warriors
/// fill in the nearest remaining on-board hexes to their jarl. Mutates
/// `state.pieces` and returns the set of hexes now occupied, so the
/// caller can keep holes off starting positions.
pub fn populate_initial_layout(state: &mut GameState) -> HashSet<Axial> {
    let radius = state.config.board_radius;
    let warrior_count = state.config.warrior_count;
    let player_count = state.players.len();
    let mut used: HashSet<Axial> = HashSet::new();

    let player_ids: Vec<_> = state.players.iter().map(|p| p.id).collect();
    for (i, player_id) in player_ids.into_iter().enumerate() {
        let dir = ((i * 6) / player_count.max(1)) as u8 % 6;
        let mut jarl_pos = Axial::ORIGIN;
        for _ in 0..radius {
            jarl_pos = hex::neighbor(jarl_pos, dir);
        }
        used.insert(jarl_pos);
        state.pieces.push(Piece {
            id: Uuid::new_v4(),
            kind: PieceType::Jarl,
            player_id: Some(player_id),
            position: jarl_pos,
        });

        let mut candidates: Vec<Axial> = hex::generate_all_board_hexes(radius)
            .into_iter()
            .filter(|h| *h != Axial::ORIGIN && *h != jarl_pos && !used.contains(h))
            .collect();
        candidates.sort_by_key(|h| hex::hex_distance(*h, jarl_pos));

        let mut placed = 0u8;
        for h in candidates {
            if placed >= warrior_count {
                break;
            }
            used.insert(h);
            state.pieces.push(Piece {
                id: Uuid::new_v4(),
                kind: PieceType::Warrior,
                player_id: Some(player_id),
                position: h,
            });
            placed += 1;
        }
    }

    used
}

/// Generates holes per §3's terrain table, excluding the Throne, edge
/// hexes, hexes within one step of an edge, and any starting position.
/// `seed` makes placement reproducible for a given game id.
pub fn generate_holes(state: &mut GameState, starting_positions: &HashSet<Axial>, seed: u64) {
    let radius = state.config.board_radius;
    let target = state.config.terrain.hole_count();

    let mut eligible: Vec<Axial> = hex::generate_all_board_hexes(radius)
        .into_iter()
        .filter(|h| *h != Axial::ORIGIN)
        .filter(|h| ring(*h) <= radius - 2)
        .filter(|h| !starting_positions.contains(h))
        .collect();

    eligible.sort_by_key(|h| (h.q, h.r));
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    eligible.shuffle(&mut rng);

    let count = target.min(eligible.len());
    state.holes = eligible.into_iter().take(count).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameConfig, Player};

    fn make_player(name: &str) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: "red".to_string(),
            is_eliminated: false,
            is_ai: false,
            ai_config: None,
        }
    }

    #[test]
    fn layout_gives_every_player_one_jarl_and_warrior_count() {
        let mut state = GameState::new(Uuid::new_v4(), GameConfig { board_radius: 4, ..Default::default() });
        state.players = vec![make_player("a"), make_player("b")];
        let used = populate_initial_layout(&mut state);

        for player in &state.players {
            let jarls = state.pieces.iter().filter(|p| p.kind == PieceType::Jarl && p.player_id == Some(player.id)).count();
            let warriors = state.pieces.iter().filter(|p| p.kind == PieceType::Warrior && p.player_id == Some(player.id)).count();
            assert_eq!(jarls, 1);
            assert_eq!(warriors, state.config.warrior_count as usize);
        }
        assert!(used.len() >= state.pieces.len());
        // No two pieces share a hex.
        let mut seen = HashSet::new();
        for p in &state.pieces {
            assert!(seen.insert(p.position), "duplicate position {:?}", p.position);
        }
    }

    #[test]
    fn holes_avoid_throne_edges_and_starting_positions() {
        let mut state = GameState::new(Uuid::new_v4(), GameConfig { board_radius: 4, ..Default::default() });
        state.players = vec![make_player("a"), make_player("b")];
        let used = populate_initial_layout(&mut state);
        generate_holes(&mut state, &used, 42);

        assert_eq!(state.holes.len(), state.config.terrain.hole_count());
        for h in &state.holes {
            assert_ne!(*h, Axial::ORIGIN);
            assert!(!hex::is_on_edge(*h, state.config.board_radius));
            assert!(ring(*h) <= state.config.board_radius - 2);
            assert!(!used.contains(h));
        }
    }

    #[test]
    fn hole_generation_is_deterministic_for_a_given_seed() {
        let mut a = GameState::new(Uuid::new_v4(), GameConfig { board_radius: 4, ..Default::default() });
        a.players = vec![make_player("a"), make_player("b")];
        let used_a = populate_initial_layout(&mut a);
        generate_holes(&mut a, &used_a, 7);

        let mut b = GameState::new(a.id, a.config.clone());
        b.players = a.players.clone();
        let used_b = populate_initial_layout(&mut b);
        generate_holes(&mut b, &used_b, 7);

        assert_eq!(a.holes, b.holes);
    }
}
