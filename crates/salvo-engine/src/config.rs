//! Engine configuration and the session lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::EngineError;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings shared by every session an engine creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Side length of the square board. Bounds attack coordinates and the
    /// candidate cells for a random attack. Must be at least 1.
    pub board_size: u8,

    /// When `true`, a player may resubmit their fleet while the session is
    /// still waiting for fleets; the later submission replaces the earlier
    /// one. When `false` a second submission fails with `DuplicateFleet`.
    pub allow_fleet_replacement: bool,

    /// Capacity of each session actor's command channel.
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: 10,
            allow_fleet_replacement: false,
            command_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Checks the configuration before an engine is built from it.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.board_size == 0 {
            return Err(EngineError::InvalidConfig(
                "board_size must be at least 1".into(),
            ));
        }
        if self.command_buffer == 0 {
            return Err(EngineError::InvalidConfig(
                "command_buffer must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a game session.
///
/// Transitions only move forward:
///
/// ```text
/// AwaitingFleets → InProgress → Finished
/// ```
///
/// - **AwaitingFleets**: the room filled; one or both players still owe a
///   fleet.
/// - **InProgress**: both fleets are in, players take turns attacking.
/// - **Finished**: someone won or a player abandoned. Terminal.
///
/// An abandoned session may jump straight from `AwaitingFleets` to
/// `Finished`; [`SessionState::can_finish`] covers that edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    AwaitingFleets,
    InProgress,
    Finished,
}

impl SessionState {
    /// Returns `true` while attacks are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns `true` once the session can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// The next state in the normal (non-abandoned) progression.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingFleets => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving to `target` is a step forward.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target) || (target == Self::Finished && self.can_finish())
    }

    /// Any non-terminal state may be finished by abandonment.
    pub fn can_finish(self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingFleets => write!(f, "AwaitingFleets"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_next_follows_strict_order() {
        assert_eq!(
            SessionState::AwaitingFleets.next(),
            Some(SessionState::InProgress)
        );
        assert_eq!(SessionState::InProgress.next(), Some(SessionState::Finished));
        assert_eq!(SessionState::Finished.next(), None);
    }

    #[test]
    fn test_session_state_never_moves_backward() {
        assert!(!SessionState::InProgress.can_transition_to(SessionState::AwaitingFleets));
        assert!(!SessionState::Finished.can_transition_to(SessionState::InProgress));
        assert!(!SessionState::Finished.can_transition_to(SessionState::Finished));
    }

    #[test]
    fn test_session_state_abandon_may_skip_in_progress() {
        assert!(SessionState::AwaitingFleets.can_transition_to(SessionState::Finished));
        assert!(SessionState::InProgress.can_transition_to(SessionState::Finished));
    }

    #[test]
    fn test_session_state_is_active_only_in_progress() {
        assert!(!SessionState::AwaitingFleets.is_active());
        assert!(SessionState::InProgress.is_active());
        assert!(!SessionState::Finished.is_active());
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::AwaitingFleets.to_string(), "AwaitingFleets");
        assert_eq!(SessionState::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_engine_config_default_is_ten_by_ten_strict() {
        let config = EngineConfig::default();
        assert_eq!(config.board_size, 10);
        assert!(!config.allow_fleet_replacement);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_validate_rejects_empty_board() {
        let config = EngineConfig {
            board_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
