//! Per-connection handler: upgrade, registration, and command routing.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Upgrade to WebSocket and join the hub (unregistered)
//!   2. Wait for `register` → authenticate → `PlayerId`
//!   3. Loop: decode commands → call the engine → answer errors
//!
//! Outbound frames go through the connection's outbox, drained by a
//! writer task, so engine events and direct replies share one ordered
//! stream with one sequence counter.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use salvo_engine::Engine;
use salvo_identity::{Authenticator, Credentials};
use salvo_protocol::{ClientCommand, Codec, Coord, Envelope, PlayerId, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::hub::{ConnectionHub, ConnectionId, Outbox};
use crate::server::ServerState;
use crate::SalvoError;

/// Drop guard that leaves the hub when the handler exits.
///
/// Runs even if the handler panics. If this was the player's last
/// connection their games are abandoned; `Drop` is synchronous, so that
/// part is a fire-and-forget task, which checks the hub again before
/// acting.
struct ConnectionGuard<A: Authenticator, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Codec> Drop for ConnectionGuard<A, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let Some(player_id) = self.state.hub().disconnect(conn_id) else {
            return;
        };
        tracing::info!(%conn_id, %player_id, "player disconnected");
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            abandon_if_gone(&state.engine, player_id).await;
        });
    }
}

/// Abandons `player_id`'s games unless they have reconnected.
///
/// Returns `true` if the engine was told to abandon.
async fn abandon_if_gone(engine: &Engine<ConnectionHub>, player_id: PlayerId) -> bool {
    if engine.sink().is_connected(player_id) {
        tracing::debug!(%player_id, "player reconnected, keeping their games");
        return false;
    }
    engine.abandon(player_id).await;
    true
}

/// Serves one socket from upgrade to close.
pub(crate) async fn handle_connection<A, C>(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState<A, C>>,
) -> Result<(), SalvoError>
where
    A: Authenticator,
    C: Codec,
{
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws.split();

    let (outbox, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let conn_id = state.hub().connect(outbox.clone());
    let guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };
    tracing::debug!(%conn_id, %addr, "accepted WebSocket connection");

    let writer_state = Arc::clone(&state);
    let writer = tokio::spawn(async move {
        let mut seq: u64 = 1;
        while let Some(event) = rx.recv().await {
            let frame = Envelope::new(next_seq(&mut seq), event);
            let bytes = match writer_state.codec.encode(&frame) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(%conn_id, error = %e, "failed to encode event");
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Binary(bytes.into())).await {
                tracing::debug!(%conn_id, error = %e, "send failed");
                break;
            }
        }
        let _ = write.close().await;
    });

    let mut player: Option<PlayerId> = None;

    while let Some(msg) = read.next().await {
        let data: Vec<u8> = match msg {
            Ok(Message::Binary(data)) => data.into(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let command = match state.codec.decode::<Envelope<ClientCommand>>(&data) {
            Ok(envelope) => envelope.payload,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                reply_error(&outbox, &SalvoError::from(e));
                continue;
            }
        };

        match player {
            None => {
                if let Some(player_id) = register(&state, conn_id, &outbox, command).await {
                    player = Some(player_id);
                }
            }
            Some(player_id) => {
                if let Err(e) = dispatch(&state, player_id, &outbox, command).await {
                    reply_error(&outbox, &e);
                }
            }
        }
    }

    // Leaving the hub drops its outbox clone; dropping ours ends the writer.
    drop(guard);
    drop(outbox);
    let _ = writer.await;
    Ok(())
}

/// Handles the first command. Returns the player id on success.
async fn register<A, C>(
    state: &Arc<ServerState<A, C>>,
    conn_id: ConnectionId,
    outbox: &Outbox,
    command: ClientCommand,
) -> Option<PlayerId>
where
    A: Authenticator,
    C: Codec,
{
    let ClientCommand::Register { name, password } = command else {
        send(outbox, error_event(401, "register first"));
        return None;
    };

    let credentials = Credentials::new(name, password);
    let player_id = match state.auth.authenticate(&credentials).await {
        Ok(player_id) => player_id,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "registration refused");
            reply_error(outbox, &SalvoError::from(e));
            return None;
        }
    };

    state.hub().register(conn_id, player_id);
    tracing::info!(%conn_id, %player_id, "player registered");

    send(
        outbox,
        ServerEvent::Registered {
            player_id,
            name: credentials.name,
        },
    );
    send(
        outbox,
        ServerEvent::RoomListChanged {
            rooms: state.engine.list_open_rooms().await,
        },
    );
    // A first-time player is broadcast to everyone, this connection
    // included; a returning one gets the standings directly.
    if !state.engine.enroll(player_id).await {
        send(
            outbox,
            ServerEvent::LeaderboardChanged {
                entries: state.engine.leaderboard().await,
            },
        );
    }
    Some(player_id)
}

/// Routes one command from a registered player to the engine.
///
/// Events that concern other players are published by the engine
/// through the hub; only direct replies are sent here.
async fn dispatch<A, C>(
    state: &Arc<ServerState<A, C>>,
    player_id: PlayerId,
    outbox: &Outbox,
    command: ClientCommand,
) -> Result<(), SalvoError>
where
    A: Authenticator,
    C: Codec,
{
    let engine = &state.engine;
    match command {
        ClientCommand::Register { .. } => {
            send(outbox, error_event(409, "already registered"));
        }
        ClientCommand::OpenRoom => {
            let room_id = engine.open_room(player_id).await;
            send(outbox, ServerEvent::RoomOpened { room_id });
        }
        ClientCommand::JoinRoom { room_id } => {
            engine.join_room(player_id, room_id).await?;
        }
        ClientCommand::ListRooms => {
            let rooms = engine.list_open_rooms().await;
            send(outbox, ServerEvent::RoomListChanged { rooms });
        }
        ClientCommand::SubmitFleet { session_id, ships } => {
            engine.submit_fleet(session_id, player_id, ships).await?;
        }
        ClientCommand::Attack { session_id, x, y } => {
            engine.attack(session_id, player_id, Coord::new(x, y)).await?;
        }
        ClientCommand::RandomAttack { session_id } => {
            engine.random_attack(session_id, player_id).await?;
        }
    }
    Ok(())
}

fn reply_error(outbox: &Outbox, err: &SalvoError) {
    send(outbox, error_event(err.code(), &err.to_string()));
}

fn error_event(code: u16, message: &str) -> ServerEvent {
    ServerEvent::Error {
        code,
        message: message.to_string(),
    }
}

fn send(outbox: &Outbox, event: ServerEvent) {
    // Fails only once the writer has stopped; the read loop ends soon after.
    let _ = outbox.send(event);
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
