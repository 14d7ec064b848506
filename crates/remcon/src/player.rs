//! Player snapshot emitted in status-query responses.

use serde::Serialize;

/// A fixed-shape player record for status responses.
///
/// The field set — names included — is a compatibility contract with the
/// existing console-client ecosystem, so fields the host doesn't track
/// are still emitted, pinned at zero. `VoiationLevel` is misspelled on
/// the wire; clients parse it that way, so it stays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RconPlayer {
    /// The player's platform identity.
    #[serde(rename = "SteamID")]
    pub steam_id: String,

    /// The owning account when the player uses a shared license; `"0"`
    /// when not applicable.
    #[serde(rename = "OwnerSteamID")]
    pub owner_steam_id: String,

    /// The player's display name.
    pub display_name: String,

    /// The player's remote address.
    pub address: String,

    /// Round-trip latency in milliseconds.
    pub ping: i32,

    /// Seconds connected. Not tracked yet; always zero.
    pub connected_seconds: i32,

    #[serde(rename = "VoiationLevel")]
    pub violation_level: f32,

    pub current_level: f32,

    pub unspent_xp: f32,

    /// The player's health, when the host tracks one.
    pub health: f32,
}

impl RconPlayer {
    /// Builds a snapshot from the values a host typically has on hand,
    /// zeroing the placeholder fields.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        address: impl Into<String>,
        ping: i32,
        health: f32,
    ) -> Self {
        Self {
            steam_id: id.into(),
            owner_steam_id: "0".to_string(),
            display_name: display_name.into(),
            address: address.into(),
            ping,
            connected_seconds: 0,
            violation_level: 0.0,
            current_level: 0.0,
            unspent_xp: 0.0,
            health,
        }
    }
}
