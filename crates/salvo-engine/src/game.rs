//! The game session state machine.
//!
//! A [`GameSession`] owns both fleets, both players' shot history, the
//! turn pointer, and the lifecycle state. It is plain synchronous data:
//! every method takes `&mut self`, validates, mutates, and returns the
//! events to deliver. Serialising access is the caller's job (see
//! [`crate::actor`]).
//!
//! A rejected command returns `Err` before touching any field, so the
//! session is always left in its prior valid state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use salvo_protocol::{
    AttackOutcome, Coord, PlayerId, Recipient, ServerEvent, SessionId, Ship,
};

use crate::fleet::Fleet;
use crate::geometry::{board_cells, in_bounds, occupied_cells};
use crate::validate::FleetValidator;
use crate::{EngineConfig, EngineError, SessionState};

/// Events produced by one operation, in delivery order.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// What happened after an attack resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStatus {
    /// The game goes on; `turn` may attack next.
    Continue { turn: PlayerId },
    /// The attacker sank the last ship.
    Won { winner: PlayerId },
}

/// The result of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    pub coord: Coord,
    pub attacker: PlayerId,
    pub outcome: AttackOutcome,
    pub status: AttackStatus,
}

impl AttackResult {
    /// The winner, if this attack ended the session.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.status {
            AttackStatus::Won { winner } => Some(winner),
            AttackStatus::Continue { .. } => None,
        }
    }
}

/// One two-player match, from fleet placement to finish.
pub struct GameSession {
    id: SessionId,
    /// `players[0]` opened the room and moves first.
    players: [PlayerId; 2],
    state: SessionState,
    fleet: Fleet,
    hits: HashMap<PlayerId, HashSet<Coord>>,
    misses: HashMap<PlayerId, HashSet<Coord>>,
    turn: Option<PlayerId>,
    winner: Option<PlayerId>,
    board_size: u8,
    allow_fleet_replacement: bool,
    validator: Arc<dyn FleetValidator>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("players", &self.players)
            .field("state", &self.state)
            .field("turn", &self.turn)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Creates a session waiting for both fleets.
    ///
    /// `players` must be two distinct ids; the room registry guarantees
    /// this by refusing self-joins.
    pub fn new(
        id: SessionId,
        players: [PlayerId; 2],
        config: &EngineConfig,
        validator: Arc<dyn FleetValidator>,
    ) -> Self {
        debug_assert_ne!(players[0], players[1], "a session needs two players");
        Self {
            id,
            players,
            state: SessionState::AwaitingFleets,
            fleet: Fleet::new(),
            hits: HashMap::new(),
            misses: HashMap::new(),
            turn: None,
            winner: None,
            board_size: config.board_size,
            allow_fleet_replacement: config.allow_fleet_replacement,
            validator,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The player allowed to attack. `None` unless in progress.
    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    /// Set only when the session finished through a win.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    /// The other player, if `player_id` is in this session.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        match self.players {
            [a, b] if a == player_id => Some(b),
            [a, b] if b == player_id => Some(a),
            _ => None,
        }
    }

    /// Cells `attacker` has hit.
    pub fn hits_of(&self, attacker: PlayerId) -> Option<&HashSet<Coord>> {
        self.hits.get(&attacker)
    }

    /// Cells `attacker` has missed.
    pub fn misses_of(&self, attacker: PlayerId) -> Option<&HashSet<Coord>> {
        self.misses.get(&attacker)
    }

    /// Returns `true` if `attacker` already fired at `coord`.
    pub fn has_targeted(&self, attacker: PlayerId, coord: Coord) -> bool {
        self.hits.get(&attacker).is_some_and(|h| h.contains(&coord))
            || self.misses.get(&attacker).is_some_and(|m| m.contains(&coord))
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Registers `player_id`'s fleet. Starts the game once both are in.
    ///
    /// On start, each player gets `SessionStarted` carrying only their own
    /// ships, followed by `TurnChanged` naming the room's opener.
    pub fn submit_fleet(
        &mut self,
        player_id: PlayerId,
        ships: Vec<Ship>,
    ) -> Result<Outbound, EngineError> {
        self.ensure_participant(player_id)?;
        self.ensure_state(SessionState::AwaitingFleets)?;
        if !self.allow_fleet_replacement && self.fleet.has_fleet(player_id) {
            return Err(EngineError::DuplicateFleet(player_id));
        }
        self.validator
            .validate(&ships, self.board_size)
            .map_err(EngineError::InvalidFleet)?;

        self.fleet
            .register_fleet(player_id, ships, self.allow_fleet_replacement)?;
        tracing::debug!(
            session_id = %self.id,
            %player_id,
            "fleet registered"
        );

        if self.players.iter().all(|p| self.fleet.has_fleet(*p)) {
            Ok(self.start())
        } else {
            Ok(Vec::new())
        }
    }

    /// Fires `attacker`'s shot at `coord` on the opponent's board.
    pub fn attack(
        &mut self,
        attacker: PlayerId,
        coord: Coord,
    ) -> Result<(AttackResult, Outbound), EngineError> {
        let defender = self.check_turn(attacker)?;
        if !in_bounds(coord, self.board_size) {
            return Err(EngineError::OutOfBounds(coord));
        }
        if self.has_targeted(attacker, coord) {
            return Err(EngineError::AlreadyTargeted(coord));
        }

        let struck = self
            .fleet
            .get(defender)
            .and_then(|fleet| fleet.ship_at(coord))
            .copied();

        let outcome = match struck {
            Some(ship) => {
                let hits = self.hits.entry(attacker).or_default();
                hits.insert(coord);
                if occupied_cells(&ship).iter().all(|c| hits.contains(c)) {
                    AttackOutcome::Kill
                } else {
                    AttackOutcome::Hit
                }
            }
            None => {
                self.misses.entry(attacker).or_default().insert(coord);
                AttackOutcome::Miss
            }
        };

        let mut out = self.to_both(ServerEvent::AttackResolved {
            session_id: self.id,
            coord,
            attacker,
            outcome,
        });

        let destroyed = self
            .hits
            .get(&attacker)
            .is_some_and(|hits| self.fleet.is_fleet_destroyed(defender, hits));

        let status = if destroyed {
            self.transition(SessionState::Finished);
            self.turn = None;
            self.winner = Some(attacker);
            tracing::info!(
                session_id = %self.id,
                winner = %attacker,
                "session won"
            );
            out.extend(self.to_both(ServerEvent::SessionFinished {
                session_id: self.id,
                winner: Some(attacker),
            }));
            AttackStatus::Won { winner: attacker }
        } else {
            let turn = if outcome.is_strike() { attacker } else { defender };
            self.turn = Some(turn);
            out.extend(self.to_both(ServerEvent::TurnChanged {
                session_id: self.id,
                turn,
            }));
            AttackStatus::Continue { turn }
        };

        tracing::debug!(
            session_id = %self.id,
            %attacker,
            %coord,
            %outcome,
            "attack resolved"
        );

        Ok((
            AttackResult {
                coord,
                attacker,
                outcome,
                status,
            },
            out,
        ))
    }

    /// Fires at a uniformly random cell `attacker` has not targeted yet.
    ///
    /// # Errors
    /// Everything [`attack`](Self::attack) can return, plus
    /// [`EngineError::NoCellsRemaining`] if the whole board has been
    /// targeted. That one means win detection failed and is logged as a
    /// defect.
    pub fn random_attack<R: Rng + ?Sized>(
        &mut self,
        attacker: PlayerId,
        rng: &mut R,
    ) -> Result<(AttackResult, Outbound), EngineError> {
        self.check_turn(attacker)?;

        let candidates: Vec<Coord> = board_cells(self.board_size)
            .filter(|coord| !self.has_targeted(attacker, *coord))
            .collect();

        let Some(&coord) = candidates.choose(rng) else {
            tracing::error!(
                session_id = %self.id,
                %attacker,
                "random attack found no untargeted cell in a live session"
            );
            return Err(EngineError::NoCellsRemaining(self.id));
        };

        self.attack(attacker, coord)
    }

    /// Ends the session because `player_id` left. No winner is recorded.
    ///
    /// Finishing an already finished session is a no-op.
    pub fn abandon(&mut self, player_id: PlayerId) -> Result<Outbound, EngineError> {
        self.ensure_participant(player_id)?;
        if self.state.is_terminal() {
            return Ok(Vec::new());
        }

        self.transition(SessionState::Finished);
        self.turn = None;
        tracing::info!(
            session_id = %self.id,
            %player_id,
            "session abandoned"
        );
        Ok(self.to_both(ServerEvent::SessionFinished {
            session_id: self.id,
            winner: None,
        }))
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn start(&mut self) -> Outbound {
        self.transition(SessionState::InProgress);
        let first = self.players[0];
        self.turn = Some(first);
        for p in self.players {
            self.hits.insert(p, HashSet::new());
            self.misses.insert(p, HashSet::new());
        }
        tracing::info!(session_id = %self.id, turn = %first, "session started");

        let mut out = Vec::with_capacity(4);
        for p in self.players {
            let ships = self
                .fleet
                .get(p)
                .map(|f| f.ships().to_vec())
                .unwrap_or_default();
            out.push((
                Recipient::Player(p),
                ServerEvent::SessionStarted {
                    session_id: self.id,
                    ships,
                    turn: first,
                },
            ));
        }
        out.extend(self.to_both(ServerEvent::TurnChanged {
            session_id: self.id,
            turn: first,
        }));
        out
    }

    /// Checks that `attacker` may fire now and returns the defender.
    fn check_turn(&self, attacker: PlayerId) -> Result<PlayerId, EngineError> {
        let defender = self
            .opponent_of(attacker)
            .ok_or(EngineError::NotAParticipant(attacker, self.id))?;
        self.ensure_state(SessionState::InProgress)?;
        if self.turn != Some(attacker) {
            return Err(EngineError::NotYourTurn(attacker));
        }
        Ok(defender)
    }

    fn ensure_participant(&self, player_id: PlayerId) -> Result<(), EngineError> {
        if self.is_participant(player_id) {
            Ok(())
        } else {
            Err(EngineError::NotAParticipant(player_id, self.id))
        }
    }

    fn ensure_state(&self, expected: SessionState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::WrongState {
                session_id: self.id,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, target: SessionState) {
        debug_assert!(
            self.state.can_transition_to(target),
            "illegal transition {} -> {}",
            self.state,
            target
        );
        self.state = target;
    }

    fn to_both(&self, event: ServerEvent) -> Outbound {
        vec![
            (Recipient::Player(self.players[0]), event.clone()),
            (Recipient::Player(self.players[1]), event),
        ]
    }
}
