//! Client commands, server events, and the envelope that carries them.
//!
//! Both enums are "adjacently tagged": a command looks like
//! `{ "type": "attack", "data": { "session_id": 1, "x": 3, "y": 4 } }`.
//! Unit variants carry no `data` field at all.

use serde::{Deserialize, Serialize};

use crate::{
    AttackOutcome, Coord, LeaderboardEntry, PlayerId, RoomId, RoomListEntry,
    SessionId, Ship,
};

/// Every frame on the wire, in either direction.
///
/// `seq` is a per-sender counter. The server echoes nothing back from it;
/// it exists so clients can spot gaps while debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub seq: u64,
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Wraps a payload.
    pub fn new(seq: u64, payload: T) -> Self {
        Self { seq, payload }
    }
}

/// Commands a connected client can send.
///
/// After `Register`, the sender's `PlayerId` is implied by the connection,
/// so no command carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Log in, or register a new name on first use.
    Register { name: String, password: String },

    /// Open a room and wait in it for an opponent.
    OpenRoom,

    /// Join someone else's open room. Starts a session on success.
    JoinRoom { room_id: RoomId },

    /// Ask for the current open-room listing.
    ListRooms,

    /// Place this player's ships for a session.
    SubmitFleet {
        session_id: SessionId,
        ships: Vec<Ship>,
    },

    /// Fire at one cell of the opponent's board.
    Attack { session_id: SessionId, x: u8, y: u8 },

    /// Fire at a random cell not yet targeted.
    RandomAttack { session_id: SessionId },
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `Register`.
    Registered { player_id: PlayerId, name: String },

    /// Reply to `OpenRoom`.
    RoomOpened { room_id: RoomId },

    /// A fresh snapshot of the open rooms.
    RoomListChanged { rooms: Vec<RoomListEntry> },

    /// A room filled and a session now exists for this player.
    SessionCreated {
        session_id: SessionId,
        player_id: PlayerId,
    },

    /// Both fleets are in. `ships` is the recipient's own fleet only.
    SessionStarted {
        session_id: SessionId,
        ships: Vec<Ship>,
        turn: PlayerId,
    },

    /// Whose turn it is now (possibly unchanged).
    TurnChanged {
        session_id: SessionId,
        turn: PlayerId,
    },

    /// The outcome of one shot.
    AttackResolved {
        session_id: SessionId,
        coord: Coord,
        attacker: PlayerId,
        outcome: AttackOutcome,
    },

    /// The session ended. `winner` is `None` when it was abandoned.
    SessionFinished {
        session_id: SessionId,
        winner: Option<PlayerId>,
    },

    /// Win counts after a session was won.
    LeaderboardChanged { entries: Vec<LeaderboardEntry> },

    /// A command from this connection was rejected.
    ///
    /// `code` follows HTTP conventions (400 bad request, 401 unauthorized,
    /// 404 not found, 409 conflict, 500 server defect).
    Error { code: u16, message: String },
}
