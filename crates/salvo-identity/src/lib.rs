//! Player identity for Salvo.
//!
//! Turns a client's name and password into a stable [`PlayerId`]. The
//! game engine never sees credentials; it only deals in ids handed out
//! here.
//!
//! ```text
//! Server (above)    ← calls authenticate() once per connection
//!     ↕
//! Identity (this crate)
//!     ↕
//! Protocol (below)  ← provides PlayerId
//! ```
//!
//! [`PlayerId`]: salvo_protocol::PlayerId

mod auth;
mod error;
mod registry;

pub use auth::{Authenticator, Credentials};
pub use error::IdentityError;
pub use registry::PlayerRegistry;
