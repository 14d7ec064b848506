//! Codec trait and the JSON implementation used on the wire.
//!
//! A codec converts between Rust types and the text frames the transport
//! carries. The console server doesn't care HOW messages are serialized —
//! it only needs something that implements [`Codec`]. The wire protocol is
//! JSON today, but keeping the seam a trait means a binary framing could
//! be added without touching dispatch code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust types to text frames and decodes frames back.
///
/// `Send + Sync + 'static` because the codec is shared across the Tokio
/// tasks that handle individual connections.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed or
    /// doesn't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Output is pretty-printed: the existing console clients were written
/// against an indented wire format, and staying byte-compatible with what
/// they already parse is worth more than the saved whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string_pretty(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteMessage;

    #[test]
    fn test_json_codec_round_trips_an_envelope() {
        let codec = JsonCodec;
        let msg = RemoteMessage::new("status", 7);

        let text = codec.encode(&msg).unwrap();
        let decoded: RemoteMessage = codec.decode(&text).unwrap();

        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_error() {
        let codec = JsonCodec;
        let result: Result<RemoteMessage, _> = codec.decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_output_is_indented() {
        // Byte-level compatibility detail: clients expect indented JSON.
        let codec = JsonCodec;
        let text = codec.encode(&RemoteMessage::broadcast("hi")).unwrap();
        assert!(text.contains('\n'));
    }
}
