//! The message envelope exchanged between the server and console clients.
//!
//! Every WebSocket text frame carries exactly one [`RemoteMessage`] as a
//! JSON object. The same shape is used in both directions: commands from
//! clients, responses from the server, and unsolicited log broadcasts.

use serde::{Deserialize, Serialize};

use crate::{Codec, JsonCodec, ProtocolError};

/// The identifier carried by messages that are not a reply to anything —
/// log broadcasts and other unsolicited traffic.
pub const BROADCAST_IDENTIFIER: i32 = -1;

/// A single message on the wire.
///
/// The field names on the wire are PascalCase (`Message`, `Identifier`,
/// `Type`, `Stacktrace`) because that is what the existing console-client
/// ecosystem sends and expects. Every field defaults when absent, so a
/// minimal frame like `{"Message":"status"}` decodes cleanly:
///
/// ```text
/// {
///   "Message": "status",        ← command / response / log text
///   "Identifier": 7,            ← correlation id, -1 = unsolicited
///   "Type": "Generic",          ← message category
///   "Stacktrace": ""            ← optional diagnostic detail
/// }
/// ```
///
/// Replies must echo the request's `Identifier` so the client can match
/// them up; broadcasts use [`BROADCAST_IDENTIFIER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RemoteMessage {
    /// The text payload: a command string, a response string, or an
    /// asynchronous log line.
    pub message: String,

    /// Correlation id. A reply echoes the id of the request it answers;
    /// `-1` marks a message not correlated to any request.
    pub identifier: i32,

    /// Message category. `"Generic"` unless the sender says otherwise.
    #[serde(rename = "Type")]
    pub kind: String,

    /// Optional diagnostic string, empty when there is nothing to report.
    pub stacktrace: String,
}

impl Default for RemoteMessage {
    fn default() -> Self {
        Self {
            message: String::new(),
            identifier: BROADCAST_IDENTIFIER,
            kind: "Generic".to_string(),
            stacktrace: String::new(),
        }
    }
}

impl RemoteMessage {
    /// Creates an envelope correlated to a specific request.
    pub fn new(message: impl Into<String>, identifier: i32) -> Self {
        Self {
            message: message.into(),
            identifier,
            ..Self::default()
        }
    }

    /// Creates an unsolicited envelope (identifier `-1`), e.g. a log line
    /// pushed to every connected console.
    pub fn broadcast(message: impl Into<String>) -> Self {
        Self::new(message, BROADCAST_IDENTIFIER)
    }

    /// Sets the message category, consuming and returning `self`.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Attaches a diagnostic stacktrace, consuming and returning `self`.
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = stacktrace.into();
        self
    }

    /// Serializes the envelope to the JSON text that goes on the wire.
    ///
    /// Shorthand for encoding with [`JsonCodec`].
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        JsonCodec.encode(self)
    }

    /// Parses an inbound text frame as an envelope.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for non-JSON input or fields of
    /// the wrong type. Never yields a partially-filled envelope.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        JsonCodec.decode(text)
    }
}

// =========================================================================
// Tests
// =========================================================================
