//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding envelopes.
///
/// A decode failure means "drop this inbound frame" to the layers above —
/// it is never fatal to the connection, let alone the server.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an envelope into a text frame).
    ///
    /// For a well-formed [`RemoteMessage`](crate::RemoteMessage) this
    /// cannot happen; the variant exists because the codec is generic.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning a text frame into an envelope).
    ///
    /// Common causes: non-JSON input, truncated frames, or fields with
    /// the wrong JSON type.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
