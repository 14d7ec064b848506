//! Unified error type for the Remcon meta crate.

use remcon_protocol::ProtocolError;
use remcon_transport::TransportError;

/// Top-level error wrapping the sub-crate errors.
///
/// Failures inside the console core are recoverable where they occur —
/// logged, optionally reported to the [`FaultSink`](crate::FaultSink),
/// and swallowed. This type exists so those sites (and embedders using
/// the re-exported APIs) deal with one error instead of two.
#[derive(Debug, thiserror::Error)]
pub enum RconError {
    /// A transport-level error (bind, upgrade, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
