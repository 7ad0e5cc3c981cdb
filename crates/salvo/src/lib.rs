//! # Salvo
//!
//! WebSocket server for two-player grid battles.
//!
//! Players register with a name and password, open or join rooms, place
//! their fleets, and take turns firing at each other's board. The server
//! is authoritative: clients send commands, the engine decides, and every
//! change is pushed back as an event.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use salvo::prelude::*;
//!
//! # async fn run() -> Result<(), SalvoError> {
//! let server = SalvoServerBuilder::new()
//!     .bind("0.0.0.0:3000")
//!     .build(PlayerRegistry::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod hub;
mod server;

pub use error::SalvoError;
pub use hub::{ConnectionHub, ConnectionId};
pub use server::{SalvoServer, SalvoServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{SalvoError, SalvoServer, SalvoServerBuilder};
    pub use salvo_engine::{EngineConfig, EngineError};
    pub use salvo_identity::{Authenticator, Credentials, IdentityError, PlayerRegistry};
    pub use salvo_protocol::{
        AttackOutcome, ClientCommand, Codec, Coord, Envelope, JsonCodec,
        LeaderboardEntry, Orientation, PlayerId, Recipient, RoomId,
        RoomListEntry, ServerEvent, SessionId, Ship,
    };
}
