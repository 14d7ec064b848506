//! Remote console configuration.

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;

/// Configuration for the remote console.
///
/// Loading this from a config file is the host application's concern;
/// the server just receives a finished value. Every field has a default
/// so partial config sections deserialize cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RconConfig {
    /// Master switch. When `false`, [`ConsoleServer::start`] is a no-op.
    ///
    /// [`ConsoleServer::start`]: crate::ConsoleServer::start
    pub enabled: bool,

    /// Address the WebSocket listener binds to.
    pub bind_address: IpAddr,

    /// Port the WebSocket listener binds to.
    pub port: u16,

    /// The shared secret. It doubles as the connection path (`/<password>`),
    /// which makes it the sole authentication factor: anyone who can open
    /// a connection at that path is trusted. An empty password keeps the
    /// console disabled.
    pub password: String,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 28016,
            password: String::new(),
        }
    }
}
