//! Wire protocol for Remcon.
//!
//! This crate defines the "language" that console clients and the server
//! speak:
//!
//! - **Envelope** ([`RemoteMessage`]) — the single message structure that
//!   travels on the wire, in both directions.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   converted to/from text frames.
//! - **Command line** ([`tokenize`], [`parse_command`]) — how an inbound
//!   envelope's text is split into a command name and arguments.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw text frames) and the
//! console server (sessions and dispatch). It doesn't know about
//! connections — it only knows how to serialize, deserialize, and tokenize.
//!
//! ```text
//! Transport (text frame) → Protocol (RemoteMessage) → Console (dispatch)
//! ```

mod codec;
mod command;
mod error;
mod message;

pub use codec::{Codec, JsonCodec};
pub use command::{parse_command, tokenize};
pub use error::ProtocolError;
pub use message::{BROADCAST_IDENTIFIER, RemoteMessage};
