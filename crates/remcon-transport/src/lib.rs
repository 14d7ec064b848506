//! WebSocket transport layer for Remcon.
//!
//! The console server treats this crate as a black box that delivers, per
//! connection, an ordered stream of [`ConnectionEvent`]s and accepts
//! outbound frames through a clonable [`OutboundSender`]. Everything
//! WebSocket-specific (upgrade handshake, framing, close frames) stays in
//! here.
//!
//! Events for one connection arrive in order; nothing is guaranteed
//! across connections.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WebSocketConnection, WebSocketTransport};

use tokio::sync::mpsc;

/// An event delivered by the transport for one connection.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A complete inbound text frame.
    Message(String),

    /// A transport-level error. The connection is still considered open;
    /// only [`ConnectionEvent::Closed`] ends it.
    Error(TransportError),

    /// The connection closed, with the peer's close code and reason
    /// passed through unchanged. A connection that drops without a close
    /// frame reports code 1006 and an empty reason.
    Closed { code: u16, reason: String },
}

/// An outbound instruction queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send a text frame.
    Text(String),

    /// Send a close frame with the given code and reason, then stop
    /// writing.
    Close { code: u16, reason: String },
}

/// A cheap, clonable handle for queueing outbound frames on a connection.
///
/// Sends are non-blocking enqueues onto an unbounded channel drained by
/// the connection's writer task. Once the connection is gone, sends are
/// silently dropped — callers treat delivery as fire-and-forget.
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl OutboundSender {
    /// Creates a sender together with the receiving end a writer task
    /// drains. Also handy for wiring up fakes in tests.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a text frame.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.tx.send(Outbound::Text(text.into()));
    }

    /// Queues a close frame with the given code and reason.
    pub fn close(&self, code: u16, reason: impl Into<String>) {
        let _ = self.tx.send(Outbound::Close {
            code,
            reason: reason.into(),
        });
    }
}
