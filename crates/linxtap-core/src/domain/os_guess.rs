//! Coarse operating-system guess from an IP time-to-live value.
//!
//! Most network stacks start outgoing packets at a well-known TTL: 64 for
//! Linux and other Unix derivatives, 128 for Windows, 255 for routers and
//! switches.  Each hop decrements the value, so an observed TTL is mapped to
//! the smallest default it could have started from.
//!
//! ```text
//!   0 ..=  32   Unknown
//!  33 ..=  64   Linux/Unix
//!  65 ..= 128   Windows
//! 129 ..= 255   Cisco/Network Device
//! > 255         Unknown
//! ```
//!
//! This is a heuristic for display only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed classification set reported for a remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RemoteOs {
    #[serde(rename = "Linux/Unix")]
    LinuxUnix,
    #[serde(rename = "Windows")]
    Windows,
    #[serde(rename = "Cisco/Network Device")]
    NetworkDevice,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl RemoteOs {
    /// The label shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOs::LinuxUnix => "Linux/Unix",
            RemoteOs::Windows => "Windows",
            RemoteOs::NetworkDevice => "Cisco/Network Device",
            RemoteOs::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RemoteOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an observed TTL to a [`RemoteOs`].
///
/// Deterministic; see the module table for the thresholds.
pub fn classify_os(ttl: u32) -> RemoteOs {
    match ttl {
        0..=32 => RemoteOs::Unknown,
        33..=64 => RemoteOs::LinuxUnix,
        65..=128 => RemoteOs::Windows,
        129..=255 => RemoteOs::NetworkDevice,
        _ => RemoteOs::Unknown,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_os_common_defaults() {
        assert_eq!(classify_os(64).as_str(), "Linux/Unix");
        assert_eq!(classify_os(128).as_str(), "Windows");
        assert_eq!(classify_os(255).as_str(), "Cisco/Network Device");
        assert_eq!(classify_os(32).as_str(), "Unknown");
    }

    #[test]
    fn test_classify_os_band_edges() {
        assert_eq!(classify_os(0), RemoteOs::Unknown);
        assert_eq!(classify_os(33), RemoteOs::LinuxUnix);
        assert_eq!(classify_os(65), RemoteOs::Windows);
        assert_eq!(classify_os(129), RemoteOs::NetworkDevice);
    }

    #[test]
    fn test_classify_os_values_above_255_are_unknown() {
        assert_eq!(classify_os(256), RemoteOs::Unknown);
        assert_eq!(classify_os(u32::MAX), RemoteOs::Unknown);
    }

    #[test]
    fn test_classify_os_after_hops_keeps_origin_band() {
        // A Linux host 7 hops away and a Windows host 12 hops away.
        assert_eq!(classify_os(57), RemoteOs::LinuxUnix);
        assert_eq!(classify_os(116), RemoteOs::Windows);
    }

    #[test]
    fn test_remote_os_default_is_unknown() {
        assert_eq!(RemoteOs::default(), RemoteOs::Unknown);
    }

    #[test]
    fn test_remote_os_serializes_as_display_label() {
        let json = serde_json::to_string(&RemoteOs::NetworkDevice).expect("serialize");
        assert_eq!(json, "\"Cisco/Network Device\"");
    }
}
