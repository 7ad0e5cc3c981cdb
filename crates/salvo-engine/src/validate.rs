//! Pluggable fleet validation, run before a submission is accepted.
//!
//! The stock [`Permissive`] validator rejects only fleets that could never
//! be sunk: no ships, zero-length ships, or cells off the board.
//! [`StandardRules`] adds the no-overlap check.

use std::collections::HashSet;

use salvo_protocol::{Coord, Ship};

use crate::geometry::{in_bounds, occupied_cells};

/// Decides whether a submitted fleet may enter a session.
///
/// Returns `Err(reason)` to reject; the reason is reported to the player
/// as [`EngineError::InvalidFleet`](crate::EngineError::InvalidFleet).
pub trait FleetValidator: Send + Sync + 'static {
    fn validate(&self, ships: &[Ship], board_size: u8) -> Result<(), String>;
}

/// Accepts any fleet that has at least one ship and whose ships all have
/// a positive length and lie on the board. Ships may overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl FleetValidator for Permissive {
    fn validate(&self, ships: &[Ship], board_size: u8) -> Result<(), String> {
        if ships.is_empty() {
            return Err("fleet has no ships".into());
        }
        for ship in ships {
            if ship.length == 0 {
                return Err(format!("ship at {} has zero length", ship.origin));
            }
            if occupied_cells(ship).len() != usize::from(ship.length) {
                return Err(format!(
                    "ship at {} runs past the coordinate space",
                    ship.origin
                ));
            }
            if !occupied_cells(ship).iter().all(|c| in_bounds(*c, board_size)) {
                return Err(format!("ship at {} leaves the board", ship.origin));
            }
        }
        Ok(())
    }
}

/// [`Permissive`] plus: no two ships sharing a cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl FleetValidator for StandardRules {
    fn validate(&self, ships: &[Ship], board_size: u8) -> Result<(), String> {
        Permissive.validate(ships, board_size)?;

        let mut seen: HashSet<Coord> = HashSet::new();
        for ship in ships {
            for cell in occupied_cells(ship) {
                if !seen.insert(cell) {
                    return Err(format!("ships overlap at {cell}"));
                }
            }
        }
        Ok(())
    }
}
