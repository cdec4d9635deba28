//! Remote endpoint value and the input rules applied before any socket work.
//!
//! The presentation shell passes the host and port exactly as the user typed
//! them.  [`Endpoint::parse`] is the only way to build an [`Endpoint`] from
//! that text, so a connection attempt can never start with an empty host or a
//! port outside `1..=65535`.

use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected user input.  Always recoverable; no connection state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Host or port field was left empty.
    #[error("IP address and port are required")]
    MissingField,
    /// The port text is not an integer.
    #[error("port must be a valid number")]
    PortNotNumeric,
    /// The port is an integer but outside `1..=65535`.
    #[error("port must be between 1 and 65535")]
    PortOutOfRange,
}

/// A validated `host:port` pair.
///
/// `host` is kept as text because it may be a hostname that is only resolved
/// when the connection is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Builds an endpoint from raw user input.
    ///
    /// Leading and trailing whitespace is ignored in both fields.
    ///
    /// # Errors
    ///
    /// - [`InputError::MissingField`] if either field is empty.
    /// - [`InputError::PortNotNumeric`] if the port does not parse as an integer.
    /// - [`InputError::PortOutOfRange`] if the integer is outside `1..=65535`,
    ///   including integers too large for any machine type.
    pub fn parse(host: &str, port_text: &str) -> Result<Self, InputError> {
        let host = host.trim();
        let port_text = port_text.trim();
        if host.is_empty() || port_text.is_empty() {
            return Err(InputError::MissingField);
        }

        let port = match port_text.parse::<i64>() {
            Ok(n) => n,
            Err(e) => {
                return Err(match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                        InputError::PortOutOfRange
                    }
                    _ => InputError::PortNotNumeric,
                })
            }
        };

        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(InputError::PortOutOfRange)?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
