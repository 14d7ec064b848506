//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! A [`WebSocketTransport`] owns the TCP listener and the single accepted
//! URL path. Each accepted connection is split in two:
//!
//! - the read half stays with the [`WebSocketConnection`] and is polled
//!   via [`next_event`](WebSocketConnection::next_event);
//! - the write half moves into a spawned writer task fed by an unbounded
//!   channel, so sends from any task are non-blocking enqueues.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::{ConnectionEvent, Outbound, OutboundSender, TransportError};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;
type WsSource = futures_util::stream::SplitStream<WsStream>;

/// Close code reported when a connection drops without a close frame.
const ABNORMAL_CLOSE: u16 = 1006;

/// Close code reported when the peer's close frame carried no status.
const NO_STATUS: u16 = 1005;

/// A WebSocket listener that accepts connections at exactly one path.
///
/// The path is the access credential: a request for any other path is
/// answered with `404` and never upgraded.
pub struct WebSocketTransport {
    listener: TcpListener,
    path: String,
}

impl WebSocketTransport {
    /// Binds a listener on `addr` accepting upgrades only at `path`
    /// (leading slash included, e.g. `"/s3cret"`).
    pub async fn bind(addr: &str, path: impl Into<String>) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::debug!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            path: path.into(),
        })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for and upgrades the next incoming connection.
    ///
    /// # Errors
    /// Returns [`TransportError::Handshake`] when the peer requested the
    /// wrong path or the upgrade failed; the accept loop should log and
    /// keep accepting.
    pub async fn accept(&self) -> Result<WebSocketConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let expected = self.path.clone();
        let check_path = move |req: &Request, resp: Response| {
            if req.uri().path() == expected {
                Ok(resp)
            } else {
                tracing::warn!(%peer, path = %req.uri().path(), "rejected connection to unknown path");
                let mut denied = ErrorResponse::new(None);
                *denied.status_mut() = StatusCode::NOT_FOUND;
                Err(denied)
            }
        };

        let ws = tokio_tungstenite::accept_hdr_async(stream, check_path)
            .await
            .map_err(TransportError::Handshake)?;

        tracing::debug!(%peer, "accepted WebSocket connection");

        let (sink, source) = ws.split();
        let (outbound, rx) = OutboundSender::channel();
        tokio::spawn(write_frames(sink, rx, peer));

        Ok(WebSocketConnection {
            peer,
            source,
            outbound,
        })
    }
}

/// One accepted WebSocket connection: the peer identity, its inbound
/// event stream, and the handle for queueing outbound frames.
pub struct WebSocketConnection {
    peer: SocketAddr,
    source: WsSource,
    outbound: OutboundSender,
}

impl WebSocketConnection {
    /// The remote peer's address and port.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Returns a clonable sender for this connection's outbound frames.
    pub fn sender(&self) -> OutboundSender {
        self.outbound.clone()
    }

    /// Waits for the next event on this connection.
    ///
    /// Yields every text frame in arrival order, surfaces read errors
    /// without ending the stream, and terminates with exactly one
    /// [`ConnectionEvent::Closed`].
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            match self.source.next().await {
                Some(Ok(Message::Text(text))) => {
                    return ConnectionEvent::Message(text.to_string());
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(f) => (u16::from(f.code), f.reason.to_string()),
                        None => (NO_STATUS, String::new()),
                    };
                    return ConnectionEvent::Closed { code, reason };
                }
                // Binary, ping, pong: not part of the protocol, skip.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return ConnectionEvent::Error(TransportError::Receive(e));
                }
                None => {
                    return ConnectionEvent::Closed {
                        code: ABNORMAL_CLOSE,
                        reason: String::new(),
                    };
                }
            }
        }
    }
}

/// Writer task: drains the outbound queue into the WebSocket sink.
///
/// Ends when the queue closes (all senders dropped), a close frame is
/// sent, or the sink reports an error.
async fn write_frames(
    mut sink: WsSink,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    peer: SocketAddr,
) {
    while let Some(frame) = rx.recv().await {
        let result = match frame {
            Outbound::Text(text) => sink.send(Message::text(text)).await,
            Outbound::Close { code, reason } => {
                let frame = CloseFrame {
                    code: code.into(),
                    reason: reason.into(),
                };
                let result = sink.send(Message::Close(Some(frame))).await;
                if result.is_err() {
                    tracing::debug!(%peer, "close frame not delivered");
                }
                break;
            }
        };

        if let Err(e) = result {
            tracing::debug!(%peer, error = %e, "outbound write failed, stopping writer");
            break;
        }
    }
}
