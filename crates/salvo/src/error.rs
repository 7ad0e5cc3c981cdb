//! Unified error type for the Salvo server.

use salvo_engine::EngineError;
use salvo_identity::IdentityError;
use salvo_protocol::ProtocolError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SalvoError {
    /// Encode, decode, or malformed frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Registration refused.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A game command was rejected.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// WebSocket handshake or framing failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Socket bind or accept failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SalvoError {
    /// The numeric code sent to the client in an `error` event.
    pub fn code(&self) -> u16 {
        match self {
            Self::Protocol(_) => 400,
            Self::Identity(_) => 401,
            Self::Engine(e) => engine_code(e),
            Self::WebSocket(_) | Self::Io(_) => 500,
        }
    }
}

fn engine_code(err: &EngineError) -> u16 {
    match err {
        EngineError::RoomNotFound(_) | EngineError::SessionNotFound(_) => 404,
        EngineError::RoomFull(_)
        | EngineError::SelfJoin(..)
        | EngineError::WrongState { .. }
        | EngineError::DuplicateFleet(_)
        | EngineError::NotYourTurn(_)
        | EngineError::AlreadyTargeted(_) => 409,
        EngineError::NotAParticipant(..)
        | EngineError::InvalidFleet(_)
        | EngineError::OutOfBounds(_)
        | EngineError::InvalidConfig(_) => 400,
        EngineError::NoCellsRemaining(_) | EngineError::Unavailable(_) => 500,
    }
}
