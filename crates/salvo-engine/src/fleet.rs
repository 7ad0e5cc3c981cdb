//! Fleets: each player's ships plus the cells they cover.

use std::collections::{HashMap, HashSet};

use salvo_protocol::{Coord, PlayerId, Ship};

use crate::geometry::{is_hit, occupied_cells};
use crate::EngineError;

/// One player's submitted ships, with their cells computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFleet {
    ships: Vec<Ship>,
    cells: HashSet<Coord>,
}

impl PlayerFleet {
    /// Builds a fleet and caches the union of its ships' cells.
    pub fn new(ships: Vec<Ship>) -> Self {
        let cells = ships.iter().flat_map(occupied_cells).collect();
        Self { ships, cells }
    }

    /// The ships in submission order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Every cell covered by at least one ship.
    pub fn cells(&self) -> &HashSet<Coord> {
        &self.cells
    }

    /// The first ship (in submission order) covering `coord`.
    pub fn ship_at(&self, coord: Coord) -> Option<&Ship> {
        self.ships.iter().find(|ship| is_hit(coord, ship))
    }
}

/// All fleets registered in one session, keyed by owner.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    by_player: HashMap<PlayerId, PlayerFleet>,
}

impl Fleet {
    /// Creates an empty fleet table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `ships` for `player_id`.
    ///
    /// # Errors
    /// [`EngineError::DuplicateFleet`] if the player already has a fleet
    /// and `allow_replacement` is `false`.
    pub fn register_fleet(
        &mut self,
        player_id: PlayerId,
        ships: Vec<Ship>,
        allow_replacement: bool,
    ) -> Result<(), EngineError> {
        if !allow_replacement && self.by_player.contains_key(&player_id) {
            return Err(EngineError::DuplicateFleet(player_id));
        }
        self.by_player.insert(player_id, PlayerFleet::new(ships));
        Ok(())
    }

    /// Returns `true` once `player_id` has a fleet.
    pub fn has_fleet(&self, player_id: PlayerId) -> bool {
        self.by_player.contains_key(&player_id)
    }

    /// Number of players with a registered fleet.
    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    /// Returns `true` if no fleet is registered yet.
    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    /// The registered fleet for `player_id`.
    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerFleet> {
        self.by_player.get(&player_id)
    }

    /// Every cell covered by `player_id`'s ships. Empty if no fleet.
    pub fn all_cells_for(&self, player_id: PlayerId) -> HashSet<Coord> {
        self.by_player
            .get(&player_id)
            .map(|fleet| fleet.cells.clone())
            .unwrap_or_default()
    }

    /// Returns `true` iff every cell of `player_id`'s fleet is in `hits`.
    ///
    /// A player without a registered fleet is never destroyed.
    pub fn is_fleet_destroyed(&self, player_id: PlayerId, hits: &HashSet<Coord>) -> bool {
        self.by_player
            .get(&player_id)
            .is_some_and(|fleet| fleet.cells.is_subset(hits))
    }
}
