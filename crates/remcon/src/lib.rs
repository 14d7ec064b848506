//! # Remcon
//!
//! A WebSocket remote console (RCON) server: external operators connect
//! over a secret-derived path, send text commands wrapped in JSON
//! envelopes, and receive responses and asynchronous log broadcasts.
//!
//! The crate wires together the layered pieces:
//!
//! ```text
//! remcon-transport   WebSocket upgrade, framing, close codes
//!        ↓
//! remcon-protocol    RemoteMessage envelope, command tokenizer
//!        ↓
//! remcon-session     RemoteClient handles, SessionRegistry
//!        ↓
//! remcon (this)      ConsoleServer lifecycle, listener state machine,
//!                    extension hooks, dispatch to the command executor
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use remcon::{ConsoleServer, RconConfig};
//!
//! # async fn run(executor: impl remcon::CommandExecutor + 'static) {
//! let server = ConsoleServer::builder()
//!     .config(RconConfig {
//!         enabled: true,
//!         password: "s3cret".into(),
//!         ..RconConfig::default()
//!     })
//!     .executor(executor)
//!     .build();
//!
//! server.start().await;
//! // ... later, e.g. pushing a log line to every connected console:
//! server.broadcast_text("player joined", -1);
//! # }
//! ```

mod backend;
mod client;
mod config;
mod error;
mod hooks;
mod listener;
mod player;
mod server;

pub use backend::{CommandExecutor, FaultSink, NoopFaultSink};
pub use config::RconConfig;
pub use error::RconError;
pub use hooks::{ConsoleHook, HookOutcome};
pub use player::RconPlayer;
pub use server::{ConsoleServer, ConsoleServerBuilder};

// Re-export the pieces users touch directly so a single dependency on
// `remcon` is enough for typical embedding.
pub use remcon_protocol::{
    BROADCAST_IDENTIFIER, Codec, JsonCodec, ProtocolError, RemoteMessage,
    parse_command, tokenize,
};
pub use remcon_session::{RemoteClient, SessionRegistry};
pub use remcon_transport::TransportError;
