//! The engine facade: the entry points the transport layer calls.
//!
//! Ties the room registry, session directory, and leaderboard together
//! and publishes lobby-wide events. Per-session work is forwarded to that
//! session's actor.
//!
//! # Locking
//!
//! The registry, directory, and leaderboard each sit behind their own
//! mutex. Where two are held at once the order is always registry, then
//! directory. No lock is held while awaiting a session actor.

use std::sync::Arc;

use salvo_protocol::{
    Coord, LeaderboardEntry, PlayerId, Recipient, RoomId, RoomListEntry,
    ServerEvent, SessionId, Ship,
};
use tokio::sync::Mutex;

use crate::actor::spawn_session;
use crate::game::{AttackResult, GameSession};
use crate::validate::{FleetValidator, Permissive};
use crate::{
    EngineConfig, EngineError, EventSink, Leaderboard, RoomRegistry,
    SessionDirectory, SessionHandle, SessionInfo,
};

/// The game session engine.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct Engine<S: EventSink> {
    config: EngineConfig,
    validator: Arc<dyn FleetValidator>,
    sink: Arc<S>,
    rooms: Mutex<RoomRegistry>,
    sessions: Mutex<SessionDirectory>,
    leaderboard: Mutex<Leaderboard>,
}

impl<S: EventSink> Engine<S> {
    /// Creates an engine that publishes through `sink`.
    ///
    /// Uses the [`Permissive`] fleet validator; see
    /// [`with_validator`](Self::with_validator).
    pub fn new(config: EngineConfig, sink: S) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            validator: Arc::new(Permissive),
            sink: Arc::new(sink),
            rooms: Mutex::new(RoomRegistry::new()),
            sessions: Mutex::new(SessionDirectory::new()),
            leaderboard: Mutex::new(Leaderboard::new()),
        })
    }

    /// Replaces the fleet validator for sessions created from now on.
    pub fn with_validator(mut self, validator: impl FleetValidator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // -----------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------

    /// Opens a room for `player_id` and broadcasts the new listing.
    pub async fn open_room(&self, player_id: PlayerId) -> RoomId {
        let mut rooms = self.rooms.lock().await;
        let room_id = rooms.open_room(player_id);
        self.broadcast_rooms(&rooms);
        room_id
    }

    /// Joins `room_id` and starts a session with its opener.
    ///
    /// Both players get `SessionCreated`; everyone gets the new listing.
    pub async fn join_room(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> Result<SessionId, EngineError> {
        let mut rooms = self.rooms.lock().await;
        let matched = rooms.join_room(player_id, room_id).inspect_err(|e| {
            tracing::debug!(%player_id, %room_id, error = %e, "join rejected");
        })?;

        let session = GameSession::new(
            matched.session_id,
            matched.players,
            &self.config,
            Arc::clone(&self.validator),
        );
        let handle =
            spawn_session(session, Arc::clone(&self.sink), self.config.command_buffer);
        self.sessions.lock().await.insert(handle);

        tracing::info!(
            session_id = %matched.session_id,
            %room_id,
            "session created"
        );
        for p in matched.players {
            self.sink.publish(
                Recipient::Player(p),
                ServerEvent::SessionCreated {
                    session_id: matched.session_id,
                    player_id: p,
                },
            );
        }
        self.broadcast_rooms(&rooms);

        Ok(matched.session_id)
    }

    /// Snapshot of the open rooms.
    pub async fn list_open_rooms(&self) -> Vec<RoomListEntry> {
        self.rooms.lock().await.list_open_rooms()
    }

    // -----------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------

    pub async fn submit_fleet(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        ships: Vec<Ship>,
    ) -> Result<(), EngineError> {
        let handle = self.session(session_id).await?;
        handle.submit_fleet(player_id, ships).await.inspect_err(|e| {
            tracing::debug!(%session_id, %player_id, error = %e, "fleet rejected");
        })
    }

    pub async fn attack(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        coord: Coord,
    ) -> Result<AttackResult, EngineError> {
        let handle = self.session(session_id).await?;
        let result = handle.attack(player_id, coord).await.inspect_err(|e| {
            tracing::debug!(%session_id, %player_id, %coord, error = %e, "attack rejected");
        })?;
        self.after_attack(session_id, &result).await;
        Ok(result)
    }

    pub async fn random_attack(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<AttackResult, EngineError> {
        let handle = self.session(session_id).await?;
        let result = handle.random_attack(player_id).await.inspect_err(|e| {
            if !e.is_defect() {
                tracing::debug!(%session_id, %player_id, error = %e, "random attack rejected");
            }
        })?;
        self.after_attack(session_id, &result).await;
        Ok(result)
    }

    /// Handles `player_id` disconnecting.
    ///
    /// Every live session they are in finishes without a winner, and any
    /// room they were waiting in is withdrawn. Returns the sessions that
    /// were finished.
    pub async fn abandon(&self, player_id: PlayerId) -> Vec<SessionId> {
        let handles = self.sessions.lock().await.sessions_for(player_id);

        let mut abandoned = Vec::with_capacity(handles.len());
        for handle in handles {
            let session_id = handle.session_id();
            match handle.abandon(player_id).await {
                Ok(()) => abandoned.push(session_id),
                Err(e) => {
                    tracing::debug!(%session_id, %player_id, error = %e, "abandon skipped");
                }
            }
            self.collect(session_id).await;
        }

        let mut rooms = self.rooms.lock().await;
        if rooms.withdraw_player(player_id) {
            self.broadcast_rooms(&rooms);
        }
        drop(rooms);

        if !abandoned.is_empty() {
            tracing::info!(%player_id, sessions = abandoned.len(), "player abandoned");
        }
        abandoned
    }

    /// Lifecycle snapshot of a live session.
    pub async fn session_info(
        &self,
        session_id: SessionId,
    ) -> Result<SessionInfo, EngineError> {
        self.session(session_id).await?.get_info().await
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    // -----------------------------------------------------------------
    // Leaderboard
    // -----------------------------------------------------------------

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.lock().await.snapshot()
    }

    /// Lists a newly registered player on the leaderboard with zero wins.
    ///
    /// Broadcasts the new standings and returns `true` the first time;
    /// later calls for the same player change nothing.
    pub async fn enroll(&self, player_id: PlayerId) -> bool {
        let mut board = self.leaderboard.lock().await;
        if !board.enroll(player_id) {
            return false;
        }
        tracing::debug!(%player_id, "player enrolled on leaderboard");
        self.sink.publish(
            Recipient::Everyone,
            ServerEvent::LeaderboardChanged {
                entries: board.snapshot(),
            },
        );
        true
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    async fn session(&self, session_id: SessionId) -> Result<SessionHandle, EngineError> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    /// Collects a won session and updates the leaderboard.
    async fn after_attack(&self, session_id: SessionId, result: &AttackResult) {
        let Some(winner) = result.winner() else {
            return;
        };
        self.collect(session_id).await;

        let mut board = self.leaderboard.lock().await;
        let wins = board.record_win(winner);
        tracing::info!(%winner, wins, "leaderboard updated");
        self.sink.publish(
            Recipient::Everyone,
            ServerEvent::LeaderboardChanged {
                entries: board.snapshot(),
            },
        );
    }

    /// Drops a finished session from the directory, stops its actor, and
    /// forgets the room it came from.
    async fn collect(&self, session_id: SessionId) {
        let removed = self.sessions.lock().await.remove(session_id);
        if let Some(handle) = removed {
            handle.shutdown().await;
            self.rooms.lock().await.forget_session(session_id);
            tracing::debug!(%session_id, "session collected");
        }
    }

    fn broadcast_rooms(&self, rooms: &RoomRegistry) {
        self.sink.publish(
            Recipient::Everyone,
            ServerEvent::RoomListChanged {
                rooms: rooms.list_open_rooms(),
            },
        );
    }
}
