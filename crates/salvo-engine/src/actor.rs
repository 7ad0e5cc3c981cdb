//! Session actor: one Tokio task per game session.
//!
//! The task owns its [`GameSession`] outright and processes commands one
//! at a time from an mpsc channel. That makes every session a single
//! writer: a turn check and the state change it guards can never
//! interleave with the other player's command. Sessions share nothing, so
//! they never wait on each other.

use std::sync::Arc;

use salvo_protocol::{Coord, PlayerId, SessionId, Ship};
use tokio::sync::{mpsc, oneshot};

use crate::game::{AttackResult, GameSession};
use crate::{EngineError, EventSink, SessionState};

/// Commands sent to a session actor. Most carry a reply channel.
pub(crate) enum SessionCommand {
    SubmitFleet {
        player_id: PlayerId,
        ships: Vec<Ship>,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Attack {
        player_id: PlayerId,
        coord: Coord,
        reply: oneshot::Sender<Result<AttackResult, EngineError>>,
    },
    RandomAttack {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<AttackResult, EngineError>>,
    },
    Abandon {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    GetInfo {
        reply: oneshot::Sender<SessionInfo>,
    },
    Shutdown,
}

/// A read-only snapshot of a session's lifecycle fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub players: [PlayerId; 2],
    pub state: SessionState,
    pub turn: Option<PlayerId>,
    pub winner: Option<PlayerId>,
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    players: [PlayerId; 2],
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    pub fn includes(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    pub async fn submit_fleet(
        &self,
        player_id: PlayerId,
        ships: Vec<Ship>,
    ) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::SubmitFleet {
            player_id,
            ships,
            reply,
        })
        .await?
    }

    pub async fn attack(
        &self,
        player_id: PlayerId,
        coord: Coord,
    ) -> Result<AttackResult, EngineError> {
        self.request(|reply| SessionCommand::Attack {
            player_id,
            coord,
            reply,
        })
        .await?
    }

    pub async fn random_attack(
        &self,
        player_id: PlayerId,
    ) -> Result<AttackResult, EngineError> {
        self.request(|reply| SessionCommand::RandomAttack { player_id, reply })
            .await?
    }

    pub async fn abandon(&self, player_id: PlayerId) -> Result<(), EngineError> {
        self.request(|reply| SessionCommand::Abandon { player_id, reply })
            .await?
    }

    pub async fn get_info(&self) -> Result<SessionInfo, EngineError> {
        self.request(|reply| SessionCommand::GetInfo { reply }).await
    }

    /// Stops the actor after it drains the commands already queued.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionCommand::Shutdown).await;
    }

    /// Sends a command and waits for its reply.
    ///
    /// A closed command channel means the actor was shut down and the
    /// session collected. A dropped reply means it died mid-command.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| EngineError::SessionNotFound(self.session_id))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.session_id))
    }
}

struct SessionActor<S: EventSink> {
    session: GameSession,
    sink: Arc<S>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<S: EventSink> SessionActor<S> {
    async fn run(mut self) {
        let session_id = self.session.id();
        tracing::debug!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::SubmitFleet {
                    player_id,
                    ships,
                    reply,
                } => {
                    let result = self
                        .session
                        .submit_fleet(player_id, ships)
                        .map(|out| self.sink.publish_all(out));
                    let _ = reply.send(result);
                }
                SessionCommand::Attack {
                    player_id,
                    coord,
                    reply,
                } => {
                    let result = self.session.attack(player_id, coord);
                    let _ = reply.send(self.deliver(result));
                }
                SessionCommand::RandomAttack { player_id, reply } => {
                    let result = self.handle_random_attack(player_id);
                    let _ = reply.send(self.deliver(result));
                }
                SessionCommand::Abandon { player_id, reply } => {
                    let result = self
                        .session
                        .abandon(player_id)
                        .map(|out| self.sink.publish_all(out));
                    let _ = reply.send(result);
                }
                SessionCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => break,
            }
        }

        tracing::debug!(%session_id, "session actor stopped");
    }

    fn handle_random_attack(
        &mut self,
        player_id: PlayerId,
    ) -> Result<(AttackResult, crate::game::Outbound), EngineError> {
        let mut rng = rand::rng();
        self.session.random_attack(player_id, &mut rng)
    }

    fn deliver(
        &self,
        result: Result<(AttackResult, crate::game::Outbound), EngineError>,
    ) -> Result<AttackResult, EngineError> {
        result.map(|(attack, out)| {
            self.sink.publish_all(out);
            attack
        })
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session.id(),
            players: self.session.players(),
            state: self.session.state(),
            turn: self.session.turn(),
            winner: self.session.winner(),
        }
    }
}

/// Spawns an actor that owns `session` and returns its handle.
pub(crate) fn spawn_session<S: EventSink>(
    session: GameSession,
    sink: Arc<S>,
    buffer: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(buffer);
    let handle = SessionHandle {
        session_id: session.id(),
        players: session.players(),
        sender: tx,
    };

    let actor = SessionActor {
        session,
        sink,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    handle
}
