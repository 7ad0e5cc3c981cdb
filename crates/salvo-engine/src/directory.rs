//! Session directory: live sessions by id.

use std::collections::HashMap;

use salvo_protocol::{PlayerId, SessionId};

use crate::SessionHandle;

/// Maps session ids to their actors.
///
/// Holds handles only; the sessions themselves live inside their actor
/// tasks. An entry exists from the moment a room fills until the session
/// finishes or is abandoned.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: HashMap<SessionId, SessionHandle>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: SessionHandle) {
        self.sessions.insert(handle.session_id(), handle);
    }

    /// A clone of the session's handle, so callers can drop the
    /// directory lock before awaiting the actor.
    pub fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.get(&session_id).cloned()
    }

    pub fn remove(&mut self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.remove(&session_id)
    }

    /// Every live session `player_id` takes part in, oldest first.
    pub fn sessions_for(&self, player_id: PlayerId) -> Vec<SessionHandle> {
        let mut handles: Vec<_> = self
            .sessions
            .values()
            .filter(|h| h.includes(player_id))
            .cloned()
            .collect();
        handles.sort_by_key(SessionHandle::session_id);
        handles
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
