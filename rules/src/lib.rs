//! Pure, deterministic rules engine for Jarls (§4.B of the specification).
//!
//! Nothing in this crate performs I/O or holds mutable shared state; every
//! public function is `(state, args) -> verdict` or `(state, args) ->
//! {new_state, events}`. The game-state machine in `game-core` is the only
//! caller that owns a live, mutable `GameState`.

pub mod combat;
pub mod engine;
pub mod errors;
pub mod invariants;
pub mod model;
pub mod moves;
pub mod setup;
pub mod starvation;

pub use combat::{attack_strength, defense_strength, simulate_attack, simulate_chain, AttackSimulation, ChainOutcome, ChainStep, CombatPreview};
pub use engine::{apply_move, check_win_conditions, MoveOutcome};
pub use errors::{StarvationChoiceError, ValidationError};
pub use model::*;
pub use moves::{draft_formation_exists, valid_moves, validate_move, MoveKind, ValidMove, ValidatedMove};
pub use setup::{generate_holes, populate_initial_layout};
