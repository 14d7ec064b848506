//! The session handle: per-connection identity plus a send capability.

use std::net::IpAddr;

use remcon_protocol::RemoteMessage;

/// A handle to one connected console session.
///
/// The registry and the dispatch pipeline work entirely in terms of this
/// trait, so they never depend on the transport's connection types. The
/// transport-facing crate implements it once per connection kind.
///
/// Sends are fire-and-forget enqueues: a handle to a connection that is
/// already gone simply drops the payload.
pub trait RemoteClient: Send + Sync {
    /// The remote peer's IP address.
    fn address(&self) -> IpAddr;

    /// The remote peer's port.
    fn port(&self) -> u16;

    /// Sends a raw text payload to this session.
    fn send_raw(&self, payload: &str);

    /// Asks the transport to close this session with the given close code
    /// and human-readable reason.
    fn close(&self, code: u16, reason: &str);

    /// Sends a structured envelope, serializing it first.
    ///
    /// Encoding a well-formed envelope cannot fail; if it ever does, the
    /// error is logged and the envelope is dropped rather than bubbling
    /// into dispatch logic.
    fn send(&self, message: &RemoteMessage) {
        match message.to_json() {
            Ok(text) => self.send_raw(&text),
            Err(e) => {
                tracing::error!(key = %self.key(), error = %e, "failed to encode envelope");
            }
        }
    }

    /// The unique registry key for this session, stable for the lifetime
    /// of one connection.
    fn key(&self) -> String {
        format!("{}:{}", self.address(), self.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    /// Records everything sent through it, for asserting on payloads.
    struct RecordingClient {
        sent: Mutex<Vec<String>>,
    }

    impl RemoteClient for RecordingClient {
        fn address(&self) -> IpAddr {
            IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5))
        }

        fn port(&self) -> u16 {
            51000
        }

        fn send_raw(&self, payload: &str) {
            self.sent.lock().unwrap().push(payload.to_string());
        }

        fn close(&self, _code: u16, _reason: &str) {}
    }

    #[test]
    fn test_key_is_address_colon_port() {
        let client = RecordingClient { sent: Mutex::new(Vec::new()) };
        assert_eq!(client.key(), "203.0.113.5:51000");
    }

    #[test]
    fn test_send_serializes_envelope_before_sending() {
        let client = RecordingClient { sent: Mutex::new(Vec::new()) };

        client.send(&RemoteMessage::new("hello", 9));

        let sent = client.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["Message"], "hello");
        assert_eq!(value["Identifier"], 9);
    }
}
