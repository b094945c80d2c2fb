//! The game state machine (§4.C of the specification): wraps the pure
//! `rules` engine with the lobby/disconnect/starvation transitions that
//! live outside it.

pub mod errors;
pub mod machine;

pub use errors::{JoinError, StarvationTurnError, StartError, TurnError};
pub use machine::GameMachine;

#[cfg(test)]
mod tests {
    use super::*;
    use hex::Axial;
    use rules::{GameConfig, Phase};

    fn start_two_player_game() -> (GameMachine, rules::PlayerId, rules::PlayerId) {
        let mut machine = GameMachine::new(uuid::Uuid::new_v4(), GameConfig { board_radius: 3, ..Default::default() });
        let a = machine.join("Alice".into(), false, None).unwrap();
        let b = machine.join("Bob".into(), false, None).unwrap();
        machine.start(a, 7).unwrap();
        (machine, a, b)
    }

    #[test]
    fn lobby_rejects_start_before_two_players_joined() {
        let mut machine = GameMachine::new(uuid::Uuid::new_v4(), GameConfig::default());
        let a = machine.join("Alice".into(), false, None).unwrap();
        assert_eq!(machine.start(a, 1), Err(StartError::NotEnoughPlayers));
    }

    #[test]
    fn lobby_rejects_non_host_start() {
        let mut machine = GameMachine::new(uuid::Uuid::new_v4(), GameConfig::default());
        let _a = machine.join("Alice".into(), false, None).unwrap();
        let b = machine.join("Bob".into(), false, None).unwrap();
        assert_eq!(machine.start(b, 1), Err(StartError::NotHost));
    }

    #[test]
    fn start_populates_board_and_enters_playing() {
        let (machine, a, _b) = start_two_player_game();
        assert_eq!(machine.state.phase, Phase::Playing);
        assert_eq!(machine.state.current_player_id, Some(a));
        assert!(machine.state.jarl_of(a).is_some());
    }

    #[test]
    fn stale_turn_number_is_rejected_without_mutating_state() {
        let (mut machine, a, _b) = start_two_player_game();
        let jarl_id = machine.state.jarl_of(a).unwrap().id;
        let turn_before = machine.state.turn_number;

        let err = machine.play_turn(a, jarl_id, Axial::new(0, 0), Some(turn_before + 1)).unwrap_err();
        assert_eq!(err, TurnError::StaleTurn);
        assert_eq!(machine.state.turn_number, turn_before);
    }

    #[test]
    fn disconnect_pauses_and_reconnect_resumes() {
        let (mut machine, a, _b) = start_two_player_game();
        assert!(machine.disconnect(a));
        assert_eq!(machine.state.phase, Phase::Paused);
        assert!(machine.reconnect(a));
        assert_eq!(machine.state.phase, Phase::Playing);
    }

    #[test]
    fn forfeit_removes_pieces_and_advances_turn() {
        let (mut machine, a, b) = start_two_player_game();
        machine.disconnect(a);
        let events = machine.forfeit(a);
        assert!(events.iter().any(|e| matches!(e, rules::GameEvent::GameEnded { winner_id, .. } if *winner_id == b)));
        assert_eq!(machine.state.phase, Phase::Ended);
        assert!(machine.state.jarl_of(a).is_none());
    }
}
