//! Session tracking for Remcon.
//!
//! This crate handles the identity side of connected consoles:
//!
//! 1. **Session handles** — the [`RemoteClient`] trait, one implementor
//!    per transport, giving the server a send capability without exposing
//!    transport internals.
//! 2. **The registry** — [`SessionRegistry`], the concurrency-safe map
//!    from session key (`"<address>:<port>"`) to handle, used to resolve
//!    inbound messages and to enumerate sessions for broadcast.
//!
//! # How it fits in the stack
//!
//! ```text
//! Console layer (above)  ← resolves handles, broadcasts via the registry
//!     ↕
//! Session layer (this crate)  ← identity and handle bookkeeping
//!     ↕
//! Protocol layer (below)  ← provides the RemoteMessage envelope
//! ```

mod client;
mod registry;

pub use client::RemoteClient;
pub use registry::SessionRegistry;
