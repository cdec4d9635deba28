//! Typed results of the two connection entry points.
//!
//! `connect` yields `Result<ConnectOutcome, ConnectError>` and
//! `send_message` yields `Result<SendReport, SendError>`.  The `Display`
//! text of every error variant is the message shown to the user, so the
//! presentation shell never has to format errors itself.
//!
//! Errors are `Clone + PartialEq` and carry OS messages as plain strings
//! rather than `std::io::Error`, which keeps them comparable in tests and
//! serialisable for the shell's JSON output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::endpoint::{Endpoint, InputError};
use super::os_guess::RemoteOs;

// ── Connect ───────────────────────────────────────────────────────────────────

/// Metadata gathered right after a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub endpoint: Endpoint,
    /// OS guess; `Unknown` when no TTL could be observed.
    pub remote_os: RemoteOs,
    /// The TTL the guess was based on, if one was observed.
    pub ttl: Option<u32>,
    /// Whether the remote host is this machine's default gateway.
    pub is_gateway: bool,
}

impl ConnectionReport {
    pub fn message(&self) -> String {
        format!("Connected to {}", self.endpoint)
    }
}

/// Successful result of `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new connection is open.
    Connected(ConnectionReport),
    /// `connect` was called while connected and closed the existing link
    /// instead of opening a new one.
    Disconnected { message: String },
}

impl ConnectOutcome {
    /// Builds the `Disconnected` outcome, naming the previous endpoint when
    /// one was known.
    pub fn disconnected_from(previous: Option<&Endpoint>) -> Self {
        let message = match previous {
            Some(ep) => format!("Disconnected from {ep}"),
            None => "Disconnected from remote device".to_string(),
        };
        ConnectOutcome::Disconnected { message }
    }

    pub fn message(&self) -> String {
        match self {
            ConnectOutcome::Connected(report) => report.message(),
            ConnectOutcome::Disconnected { message } => message.clone(),
        }
    }
}

/// Failure of `connect`.  The manager is always disconnected afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("connection timeout to {endpoint}")]
    Timeout { endpoint: Endpoint },
    /// The host could not be resolved to any socket address.
    #[error("invalid IP address {host}")]
    InvalidAddress { host: String },
    #[error("connection refused by {endpoint}")]
    Refused { endpoint: Endpoint },
    /// Any other OS-level socket error; carries the native message.
    #[error("{0}")]
    Os(String),
    #[error("unexpected error - {0}")]
    Unexpected(String),
}

// ── Send ──────────────────────────────────────────────────────────────────────

/// Successful result of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    /// Number of bytes written; always the full UTF-8 length of the message.
    pub bytes_sent: usize,
    /// Reply read within the response window, lossily decoded as UTF-8.
    pub response: Option<String>,
}

impl SendReport {
    pub fn message(&self) -> String {
        format!("Sent {} bytes", self.bytes_sent)
    }
}

/// Failure of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("not connected to any device")]
    NotConnected,
    #[error("message cannot be empty")]
    EmptyMessage,
    /// Write or read hit a broken pipe; the manager disconnected.
    #[error("connection broken - device disconnected")]
    BrokenPipe,
    /// The peer reset the connection; the manager disconnected.
    #[error("connection reset by remote device")]
    ConnectionReset,
    /// Any other transport error; the connection is kept.
    #[error("failed to send: {0}")]
    Transport(String),
}

impl SendError {
    /// Whether this error forced the manager into the disconnected state.
    pub fn drops_connection(&self) -> bool {
        matches!(self, SendError::BrokenPipe | SendError::ConnectionReset)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
