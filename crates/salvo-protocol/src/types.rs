//! Core value types shared by every layer of Salvo.
//!
//! Identifiers, board coordinates, ship placements, and shot outcomes.
//! These all travel on the wire, so their serde shapes are part of the
//! client contract.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Assigned once per identity by the identity layer and stable for the
/// lifetime of the process, including across reconnects. The engine never
/// sees names or passwords, only this id.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire:
/// `PlayerId(42)` becomes `42`, not `{"0":42}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (a single-occupant matchmaking slot).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A unique identifier for a game session (one match between two players).
///
/// Rooms and sessions are linked by id only. A room that fills hands its
/// players to a freshly numbered session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Board types
// ---------------------------------------------------------------------------

/// A cell on the board. `x` grows to the right, `y` grows downward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which way a ship extends from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Cells step +1 along x.
    Horizontal,
    /// Cells step +1 along y.
    Vertical,
}

/// A ship as submitted by a player. Immutable once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    /// The first cell the ship occupies.
    pub origin: Coord,
    pub orientation: Orientation,
    /// Number of cells, counted from `origin`.
    pub length: u8,
}

impl Ship {
    /// Creates a ship.
    pub const fn new(origin: Coord, orientation: Orientation, length: u8) -> Self {
        Self {
            origin,
            orientation,
            length,
        }
    }
}

/// The result of a single attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackOutcome {
    /// No ship occupies the cell.
    Miss,
    /// A ship occupies the cell and still has unstruck cells.
    Hit,
    /// The strike completed a ship's destruction.
    Kill,
}

impl AttackOutcome {
    /// `true` for `Hit` and `Kill`: the attacker keeps the turn.
    pub fn is_strike(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::Hit => write!(f, "hit"),
            Self::Kill => write!(f, "kill"),
        }
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// One open room in a lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    /// The waiting players. Always exactly one for an open room.
    pub occupants: Vec<PlayerId>,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub wins: u32,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an outbound event.
///
/// The engine never holds connections. It pairs each event with a
/// `Recipient` and the transport decides which sockets that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every open connection, registered or not.
    Everyone,
    /// Every connection authenticated as this player.
    Player(PlayerId),
}
