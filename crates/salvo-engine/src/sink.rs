//! Outbound event publication.
//!
//! The engine never touches connections. It hands each event and its
//! [`Recipient`] to an [`EventSink`], and the transport layer decides
//! which sockets that means.

use salvo_protocol::{Recipient, ServerEvent};
use tokio::sync::mpsc;

/// Receives every event the engine produces, in production order.
///
/// `publish` is called while the producing session (or registry) is
/// locked, so it must not block. Push into a channel or a buffer.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, recipient: Recipient, event: ServerEvent);

    /// Publishes a batch in order.
    fn publish_all(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            self.publish(recipient, event);
        }
    }
}

/// An [`EventSink`] that forwards into an unbounded Tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<(Recipient, ServerEvent)>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(Recipient, ServerEvent)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, recipient: Recipient, event: ServerEvent) {
        if self.sender.send((recipient, event)).is_err() {
            tracing::warn!(?recipient, "event receiver gone, dropping event");
        }
    }
}
