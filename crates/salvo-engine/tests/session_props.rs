use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use salvo_engine::geometry::occupied_cells;
use salvo_engine::{
    AttackStatus, EngineConfig, EngineError, GameSession, Permissive, SessionState,
};
use salvo_protocol::{AttackOutcome, Coord, Orientation, PlayerId, SessionId, Ship};

const SIZE: u8 = 6;
const A: PlayerId = PlayerId(1);
const B: PlayerId = PlayerId(2);

/// A ship that always fits on a `SIZE` board.
fn ship_strategy() -> impl Strategy<Value = Ship> {
    (0..SIZE, 0..SIZE, any::<bool>(), 1..=3u8).prop_map(|(x, y, vertical, len)| {
        let (orientation, room) = if vertical {
            (Orientation::Vertical, SIZE - y)
        } else {
            (Orientation::Horizontal, SIZE - x)
        };
        Ship::new(Coord::new(x, y), orientation, len.min(room))
    })
}

fn fleet_strategy() -> impl Strategy<Value = Vec<Ship>> {
    prop::collection::vec(ship_strategy(), 1..4)
}

fn started(fleet_a: Vec<Ship>, fleet_b: Vec<Ship>) -> GameSession {
    let config = EngineConfig {
        board_size: SIZE,
        ..EngineConfig::default()
    };
    let mut session = GameSession::new(SessionId(1), [A, B], &config, Arc::new(Permissive));
    session.submit_fleet(A, fleet_a).unwrap();
    session.submit_fleet(B, fleet_b).unwrap();
    session
}

fn cells(fleet: &[Ship]) -> HashSet<Coord> {
    fleet.iter().flat_map(occupied_cells).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Random play always ends in a win, with turns handed over exactly on
    /// misses and no cell ever targeted twice by the same attacker.
    #[test]
    fn random_play_obeys_turn_and_shot_rules(
        fleet_a in fleet_strategy(),
        fleet_b in fleet_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = started(fleet_a.clone(), fleet_b.clone());
        let mut shots: Vec<(PlayerId, Coord)> = Vec::new();

        let winner = loop {
            let attacker = session.turn().unwrap();
            let (result, _) = session.random_attack(attacker, &mut rng).unwrap();

            prop_assert_eq!(result.attacker, attacker);
            prop_assert!(!shots.contains(&(attacker, result.coord)));
            shots.push((attacker, result.coord));

            match result.status {
                AttackStatus::Continue { turn } => {
                    let expected = if result.outcome.is_strike() {
                        attacker
                    } else {
                        session.opponent_of(attacker).unwrap()
                    };
                    prop_assert_eq!(turn, expected);
                    prop_assert_eq!(session.turn(), Some(turn));
                }
                AttackStatus::Won { winner } => break winner,
            }
        };

        prop_assert_eq!(session.state(), SessionState::Finished);
        prop_assert_eq!(session.winner(), Some(winner));
        prop_assert_eq!(session.turn(), None);

        // The winner hit every cell of the loser's fleet.
        let loser_cells = if winner == A { cells(&fleet_b) } else { cells(&fleet_a) };
        let hits = session.hits_of(winner).unwrap();
        prop_assert!(loser_cells.is_subset(hits));

        // The loser did not finish the winner's fleet.
        let loser = session.opponent_of(winner).unwrap();
        let winner_cells = if winner == A { cells(&fleet_a) } else { cells(&fleet_b) };
        let loser_hits = session.hits_of(loser).cloned().unwrap_or_default();
        prop_assert!(!winner_cells.is_subset(&loser_hits));

        // Hits and misses partition each attacker's shots.
        for p in [A, B] {
            let hits = session.hits_of(p).cloned().unwrap_or_default();
            let misses = session.misses_of(p).cloned().unwrap_or_default();
            prop_assert!(hits.is_disjoint(&misses));
            let fired = shots.iter().filter(|(who, _)| *who == p).count();
            prop_assert_eq!(hits.len() + misses.len(), fired);
        }

        // Nothing is accepted after the finish.
        let late = session.attack(winner, Coord::new(0, 0));
        let finished = matches!(late, Err(EngineError::WrongState { .. }));
        prop_assert!(finished);
    }

    /// A rejected attack never changes the session.
    #[test]
    fn rejected_attacks_leave_state_untouched(
        fleet_a in fleet_strategy(),
        fleet_b in fleet_strategy(),
        x in 0..SIZE,
        y in 0..SIZE,
    ) {
        let mut session = started(fleet_a, fleet_b);

        // B is not on turn.
        let err = session.attack(B, Coord::new(x, y)).unwrap_err();
        prop_assert_eq!(err, EngineError::NotYourTurn(B));
        prop_assert_eq!(session.turn(), Some(A));
        prop_assert!(!session.has_targeted(B, Coord::new(x, y)));

        // Off the board.
        let err = session.attack(A, Coord::new(SIZE, y)).unwrap_err();
        prop_assert_eq!(err, EngineError::OutOfBounds(Coord::new(SIZE, y)));
        prop_assert_eq!(session.turn(), Some(A));

        // Same cell twice while A keeps the turn.
        let (first, _) = session.attack(A, Coord::new(x, y)).unwrap();
        if first.outcome != AttackOutcome::Miss && first.winner().is_none() {
            let err = session.attack(A, Coord::new(x, y)).unwrap_err();
            prop_assert_eq!(err, EngineError::AlreadyTargeted(Coord::new(x, y)));
            prop_assert_eq!(session.turn(), Some(A));
        }
    }

    /// The default rules refuse any ship with a cell off the board, so
    /// every accepted fleet can be sunk.
    #[test]
    fn off_board_ships_are_refused(
        x in 0..SIZE,
        y in 0..SIZE,
        vertical in any::<bool>(),
        overhang in 1..=4u8,
    ) {
        let (orientation, room) = if vertical {
            (Orientation::Vertical, SIZE - y)
        } else {
            (Orientation::Horizontal, SIZE - x)
        };
        let ship = Ship::new(Coord::new(x, y), orientation, room + overhang);
        let config = EngineConfig {
            board_size: SIZE,
            ..EngineConfig::default()
        };
        let mut session =
            GameSession::new(SessionId(1), [A, B], &config, Arc::new(Permissive));

        let refused = matches!(
            session.submit_fleet(A, vec![ship]),
            Err(EngineError::InvalidFleet(_))
        );
        prop_assert!(refused);
        prop_assert!(!session.fleet().has_fleet(A));
    }
}
