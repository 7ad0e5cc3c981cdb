//! Game session engine for Salvo.
//!
//! Pairs players into two-player sessions and runs each match: fleet
//! placement, turn-ordered attacks, hit/kill detection, and win or
//! abandonment. Everything is in memory.
//!
//! # Key types
//!
//! - [`Engine`]: entry points for rooms, fleets, attacks, and abandon
//! - [`GameSession`]: the per-match state machine
//! - [`RoomRegistry`]: the pool of open rooms
//! - [`SessionDirectory`]: live sessions by id
//! - [`EventSink`]: where outbound events go
//! - [`FleetValidator`]: pluggable fleet checks
//!
//! Each session runs as its own Tokio task (see [`SessionHandle`]), so
//! commands for one session are applied one at a time while different
//! sessions proceed independently.

mod actor;
mod config;
mod directory;
mod engine;
mod error;
mod fleet;
mod game;
pub mod geometry;
mod leaderboard;
mod registry;
mod sink;
mod validate;

pub use actor::{SessionHandle, SessionInfo};
pub use config::{EngineConfig, SessionState};
pub use directory::SessionDirectory;
pub use engine::Engine;
pub use error::EngineError;
pub use fleet::{Fleet, PlayerFleet};
pub use game::{AttackResult, AttackStatus, GameSession, Outbound};
pub use leaderboard::Leaderboard;
pub use registry::{Match, Room, RoomRegistry};
pub use sink::{ChannelSink, EventSink};
pub use validate::{FleetValidator, Permissive, StandardRules};
