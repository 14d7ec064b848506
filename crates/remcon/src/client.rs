//! The WebSocket-backed session handle.

use std::net::SocketAddr;

use remcon_session::RemoteClient;
use remcon_transport::OutboundSender;

/// A [`RemoteClient`] bound to one WebSocket connection's outbound queue.
///
/// Holds only the peer identity and a send capability — no transport
/// internals — so handles stay cheap to keep in the registry after the
/// connection task has moved on.
pub(crate) struct WebSocketClient {
    peer: SocketAddr,
    sender: OutboundSender,
}

impl WebSocketClient {
    pub(crate) fn new(peer: SocketAddr, sender: OutboundSender) -> Self {
        Self { peer, sender }
    }
}

impl RemoteClient for WebSocketClient {
    fn address(&self) -> std::net::IpAddr {
        self.peer.ip()
    }

    fn port(&self) -> u16 {
        self.peer.port()
    }

    fn send_raw(&self, payload: &str) {
        self.sender.send_text(payload);
    }

    fn close(&self, code: u16, reason: &str) {
        self.sender.close(code, reason);
    }
}
