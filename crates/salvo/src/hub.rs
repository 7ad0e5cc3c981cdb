//! Connection hub: routes engine events to open WebSocket connections.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use salvo_engine::EventSink;
use salvo_protocol::{PlayerId, Recipient, ServerEvent};
use tokio::sync::mpsc;

/// Counter for generating unique connection ids.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one accepted connection for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Outbound queue of one connection. Drained by its writer task.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

struct Peer {
    player_id: Option<PlayerId>,
    outbox: Outbox,
}

/// Every open connection and the player it is registered as.
///
/// Uses a std mutex: it is never held across an `.await`, and
/// [`EventSink::publish`] is synchronous.
#[derive(Default)]
pub struct ConnectionHub {
    peers: Mutex<HashMap<ConnectionId, Peer>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unregistered connection and returns its id.
    pub fn connect(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::next();
        self.lock().insert(
            id,
            Peer {
                player_id: None,
                outbox,
            },
        );
        id
    }

    /// Marks `conn_id` as belonging to `player_id`.
    pub fn register(&self, conn_id: ConnectionId, player_id: PlayerId) {
        if let Some(peer) = self.lock().get_mut(&conn_id) {
            peer.player_id = Some(player_id);
        }
    }

    /// Removes a connection.
    ///
    /// Returns its player if this was the player's last open connection.
    pub fn disconnect(&self, conn_id: ConnectionId) -> Option<PlayerId> {
        let mut peers = self.lock();
        let player_id = peers.remove(&conn_id)?.player_id?;
        let still_connected = peers
            .values()
            .any(|peer| peer.player_id == Some(player_id));
        (!still_connected).then_some(player_id)
    }

    /// Returns `true` if any open connection is registered as `player_id`.
    pub fn is_connected(&self, player_id: PlayerId) -> bool {
        self.lock()
            .values()
            .any(|peer| peer.player_id == Some(player_id))
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, Peer>> {
        // A poisoned map is still structurally sound; keep routing.
        self.peers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for ConnectionHub {
    fn publish(&self, recipient: Recipient, event: ServerEvent) {
        let peers = self.lock();
        for (conn_id, peer) in peers.iter() {
            let wanted = match recipient {
                Recipient::Everyone => true,
                Recipient::Player(p) => peer.player_id == Some(p),
            };
            if wanted && peer.outbox.send(event.clone()).is_err() {
                tracing::warn!(%conn_id, "connection writer gone, dropping event");
            }
        }
    }
}
