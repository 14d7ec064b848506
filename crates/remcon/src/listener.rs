//! Per-connection listener: the state machine bridging transport events
//! to the console pipeline.
//!
//! Each accepted connection gets one [`RconListener`], driven by a Tokio
//! task reading that connection's events. The machine is single-use:
//!
//! ```text
//! Open ──(transport opened)──→ Active ──(transport closed)──→ Closed
//!                                │  ↺ message / error
//! ```
//!
//! `Closed` is terminal; events arriving after it are ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use remcon_transport::{
    ConnectionEvent, OutboundSender, TransportError, WebSocketConnection,
};

use crate::server::ConsoleContext;

/// Lifecycle state of one connection's listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenerState {
    /// Constructed, transport not yet confirmed open.
    Open,
    /// Connection established; messages flow.
    Active,
    /// Connection ended. Terminal.
    Closed,
}

/// The per-connection state machine.
pub(crate) struct RconListener {
    ctx: Arc<ConsoleContext>,
    peer: SocketAddr,
    sender: OutboundSender,
    state: ListenerState,
}

impl RconListener {
    pub(crate) fn new(
        ctx: Arc<ConsoleContext>,
        peer: SocketAddr,
        sender: OutboundSender,
    ) -> Self {
        Self {
            ctx,
            peer,
            sender,
            state: ListenerState::Open,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ListenerState {
        self.state
    }

    /// Transport confirmed the connection: register the session handle so
    /// broadcasts reach this console even before it sends anything, log,
    /// and go active.
    ///
    /// A connection whose open races the server's stop stays in `Open`
    /// and never registers; its task is torn down by the stop.
    pub(crate) fn on_open(&mut self) {
        if self.state != ListenerState::Open {
            return;
        }
        if !self.ctx.is_online() {
            return;
        }
        self.ctx.resolve_client(self.peer, &self.sender);
        tracing::info!(address = %self.peer.ip(), port = self.peer.port(), "new console connection");
        self.state = ListenerState::Active;
    }

    /// An inbound text frame: forward to the console pipeline.
    pub(crate) fn on_message(&self, payload: &str) {
        if self.state != ListenerState::Active {
            return;
        }
        self.ctx.handle_inbound(payload, self.peer, &self.sender);
    }

    /// A transport error: log it. The connection stays up — only an
    /// explicit close event ends it.
    pub(crate) fn on_error(&self, error: &TransportError) {
        tracing::error!(address = %self.peer.ip(), error = %error, "console connection error");
    }

    /// The connection closed: deregister the session and go terminal.
    pub(crate) fn on_close(&mut self, code: u16, reason: &str) {
        if self.state == ListenerState::Closed {
            return;
        }
        self.ctx
            .registry
            .remove(&format!("{}:{}", self.peer.ip(), self.peer.port()));

        let reason = if reason.is_empty() { "Unknown" } else { reason };
        tracing::info!(address = %self.peer.ip(), %reason, code, "console connection closed");
        self.state = ListenerState::Closed;
    }
}

/// Drives one connection's listener until the connection ends.
pub(crate) async fn drive(mut conn: WebSocketConnection, ctx: Arc<ConsoleContext>) {
    let mut listener = RconListener::new(ctx, conn.peer(), conn.sender());
    listener.on_open();

    loop {
        match conn.next_event().await {
            ConnectionEvent::Message(text) => listener.on_message(&text),
            ConnectionEvent::Error(e) => listener.on_error(&e),
            ConnectionEvent::Closed { code, reason } => {
                listener.on_close(code, &reason);
                break;
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
