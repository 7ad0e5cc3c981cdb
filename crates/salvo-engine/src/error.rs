//! Error types for the engine.

use salvo_protocol::{Coord, PlayerId, RoomId, SessionId};

use crate::SessionState;

/// Errors returned by engine operations.
///
/// Every rejection leaves the room or session exactly as it was. The
/// engine never retries; the caller decides what to do next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No room with this id exists.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The room already has two players and a session.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player tried to join the room they opened.
    #[error("player {0} already occupies room {1}")]
    SelfJoin(PlayerId, RoomId),

    /// No live session with this id exists (never created, or already
    /// finished and collected).
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The player is not one of the session's two participants.
    #[error("player {0} is not in session {1}")]
    NotAParticipant(PlayerId, SessionId),

    /// The operation is not allowed in the session's current state.
    #[error("session {session_id} is {state}")]
    WrongState {
        session_id: SessionId,
        state: SessionState,
    },

    /// The player already submitted a fleet for this session.
    #[error("player {0} already submitted a fleet")]
    DuplicateFleet(PlayerId),

    /// The fleet validator refused the submission.
    #[error("invalid fleet: {0}")]
    InvalidFleet(String),

    /// It is the other player's turn.
    #[error("not player {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The attacker already fired at this cell.
    #[error("cell {0} already targeted")]
    AlreadyTargeted(Coord),

    /// The coordinate lies outside the board.
    #[error("cell {0} is outside the board")]
    OutOfBounds(Coord),

    /// A random attack found no untargeted cell. Win detection should
    /// always fire first, so this is a defect rather than user error.
    #[error("no untargeted cells remain in session {0}")]
    NoCellsRemaining(SessionId),

    /// The engine configuration is unusable.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// The session's actor stopped before it could answer.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}

impl EngineError {
    /// `true` for errors that indicate a broken invariant rather than a
    /// rejected command.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::NoCellsRemaining(_))
    }
}
