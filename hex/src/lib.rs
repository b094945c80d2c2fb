//! Axial/cube hex-grid geometry for a pointy-top hexagonal board.
//!
//! Every operation here is pure and total: given a coordinate (and, where
//! relevant, a board radius) there is exactly one answer, and no input can
//! make these functions fail. Callers in `rules` are responsible for
//! pre-checking anything that would be a precondition (e.g. collinearity
//! before calling [`hex_line`]).

use serde::{Deserialize, Serialize};

/// An axial hex coordinate. The implicit cube `s` coordinate is `-q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const ORIGIN: Axial = Axial { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Axial { q, r }
    }

    /// The implicit third cube coordinate.
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }
}

impl std::ops::Add for Axial {
    type Output = Axial;
    fn add(self, rhs: Axial) -> Axial {
        Axial::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl std::ops::Sub for Axial {
    type Output = Axial;
    fn sub(self, rhs: Axial) -> Axial {
        Axial::new(self.q - rhs.q, self.r - rhs.r)
    }
}

/// Cube-coordinate form, used internally for symmetric distance/line math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cube {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

pub fn axial_to_cube(h: Axial) -> Cube {
    Cube { q: h.q, r: h.r, s: h.s() }
}

pub fn cube_to_axial(c: Cube) -> Axial {
    Axial::new(c.q, c.r)
}

/// The six hex directions, in the fixed order used throughout the rules
/// engine: east, northeast, northwest, west, southwest, southeast.
pub const DIRECTIONS: [Axial; 6] = [
    Axial { q: 1, r: 0 },
    Axial { q: 1, r: -1 },
    Axial { q: 0, r: -1 },
    Axial { q: -1, r: 0 },
    Axial { q: -1, r: 1 },
    Axial { q: 0, r: 1 },
];

/// Direction index 0..6. Stored as a plain `u8` rather than an enum so it
/// can be used directly as an index into [`DIRECTIONS`].
pub type Dir = u8;

/// The unit offset for a direction index. Panics on an out-of-range index;
/// callers only ever construct `Dir` from `0..6` loops or [`line_direction`].
pub fn neighbor(h: Axial, dir: Dir) -> Axial {
    h + DIRECTIONS[dir as usize]
}

/// The opposite direction, three steps around the hexagon.
pub fn opposite_dir(d: Dir) -> Dir {
    (d + 3) % 6
}

/// Hex (Manhattan-on-cube) distance between two coordinates.
pub fn hex_distance(a: Axial, b: Axial) -> i32 {
    let da = a - b;
    (da.q.abs() + da.r.abs() + da.s().abs()) / 2
}

/// `true` iff `h` lies within radius `r` of the origin.
pub fn is_on_board(h: Axial, radius: i32) -> bool {
    let c = axial_to_cube(h);
    c.q.abs().max(c.r.abs()).max(c.s.abs()) <= radius
}

/// `true` iff `h` lies at exactly maximum radius — the outermost ring.
pub fn is_on_edge(h: Axial, radius: i32) -> bool {
    let c = axial_to_cube(h);
    c.q.abs().max(c.r.abs()).max(c.s.abs()) == radius
}

/// If `to - from` lies along one of the six axes, returns the direction
/// index and the distance in hexes. Otherwise returns `None`.
pub fn line_direction(from: Axial, to: Axial) -> Option<(Dir, i32)> {
    if from == to {
        return None;
    }
    let dist = hex_distance(from, to);
    for (idx, _) in DIRECTIONS.iter().enumerate() {
        let mut cur = from;
        for step in 1..=dist {
            cur = neighbor(cur, idx as Dir);
            if cur == to {
                return Some((idx as Dir, step));
            }
        }
    }
    None
}

/// Inclusive sequence of hexes on the straight line between `a` and `b`.
///
/// Only valid for collinear inputs (as established by [`line_direction`]);
/// callers must pre-check collinearity before calling this, per §4.A.
pub fn hex_line(a: Axial, b: Axial) -> Vec<Axial> {
    let (dir, dist) = line_direction(a, b).expect("hex_line called on non-collinear points");
    let mut out = Vec::with_capacity(dist as usize + 1);
    let mut cur = a;
    out.push(cur);
    for _ in 0..dist {
        cur = neighbor(cur, dir);
        out.push(cur);
    }
    out
}

/// All hexes within `radius` of the origin, in no particular order.
pub fn generate_all_board_hexes(radius: i32) -> Vec<Axial> {
    let mut hexes = Vec::new();
    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            hexes.push(Axial::new(q, r));
        }
    }
    hexes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(hex_distance(Axial::new(2, -1), Axial::new(2, -1)), 0);
    }

    #[test]
    fn distance_matches_known_values() {
        assert_eq!(hex_distance(Axial::ORIGIN, Axial::new(3, 0)), 3);
        assert_eq!(hex_distance(Axial::ORIGIN, Axial::new(2, -2)), 2);
        assert_eq!(hex_distance(Axial::new(-1, 2), Axial::new(3, -1)), 5);
    }

    #[test]
    fn opposite_dir_is_involution() {
        for d in 0..6u8 {
            assert_eq!(opposite_dir(opposite_dir(d)), d);
        }
    }

    #[test]
    fn neighbor_and_opposite_cancel() {
        let h = Axial::new(1, 1);
        for d in 0..6u8 {
            let moved = neighbor(h, d);
            assert_eq!(neighbor(moved, opposite_dir(d)), h);
        }
    }

    #[test]
    fn board_membership_radius_three() {
        assert!(is_on_board(Axial::new(3, 0), 3));
        assert!(!is_on_board(Axial::new(4, 0), 3));
        assert!(is_on_edge(Axial::new(3, 0), 3));
        assert!(!is_on_edge(Axial::new(2, 0), 3));
    }

    #[test]
    fn generate_all_board_hexes_count() {
        // A hex board of radius R has 3R^2 + 3R + 1 cells.
        let r = 3;
        let hexes = generate_all_board_hexes(r);
        assert_eq!(hexes.len() as i32, 3 * r * r + 3 * r + 1);
        assert!(hexes.iter().all(|h| is_on_board(*h, r)));
    }

    #[test]
    fn line_direction_detects_collinear_and_rejects_others() {
        assert_eq!(line_direction(Axial::new(0, 0), Axial::new(3, 0)), Some((0, 3)));
        assert_eq!(line_direction(Axial::new(0, 0), Axial::new(1, 1)), None);
    }

    #[test]
    fn hex_line_is_inclusive() {
        let line = hex_line(Axial::new(0, 0), Axial::new(2, 0));
        assert_eq!(line, vec![Axial::new(0, 0), Axial::new(1, 0), Axial::new(2, 0)]);
    }
}
