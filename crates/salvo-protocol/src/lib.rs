//! Wire protocol for Salvo.
//!
//! This crate defines the vocabulary every other layer shares:
//!
//! - **Types** ([`PlayerId`], [`Coord`], [`Ship`], [`AttackOutcome`], ...):
//!   identifiers and board values.
//! - **Messages** ([`ClientCommand`], [`ServerEvent`], [`Envelope`]): what
//!   travels between clients and the server.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, typed frames out.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Engine (commands and events)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientCommand, Envelope, ServerEvent};
pub use types::{
    AttackOutcome, Coord, LeaderboardEntry, Orientation, PlayerId, Recipient,
    RoomId, RoomListEntry, SessionId, Ship,
};
