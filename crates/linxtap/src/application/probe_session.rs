//! ProbeSessionUseCase: one user's session against a single remote device.
//!
//! The presentation shell never calls the connection manager directly; it
//! drives a [`ProbeSession`], which forwards each request to a [`Link`] and
//! records what happened in the session's [`SessionLog`].
//!
//! # Log lines per operation
//!
//! | Operation            | Outcome               | Entries appended                                  |
//! |----------------------|-----------------------|---------------------------------------------------|
//! | `connect`            | connected             | `Connected to h:p` (system)                       |
//! | `connect` / toggle   | disconnected          | `Disconnected` (system)                           |
//! | `connect`            | error                 | `✗ <error>` (error)                               |
//! | `send`               | success               | `SENT: m`, `✓ Sent N bytes`, `RESPONSE: r` if any |
//! | `send`               | error                 | `✗ <error>`, then `Connection lost` if the link dropped |
//! | `send`               | empty message         | nothing                                           |
//!
//! The session is generic over [`Link`] so tests substitute a mock for the
//! socket-backed `ConnectionManager`.

use std::path::Path;

use linxtap_core::{ConnectError, ConnectOutcome, SendError, SendReport};
use tracing::debug;

use super::session_log::{EntryKind, ExportError, SessionLog};

/// A single point-to-point connection as seen by the application layer.
///
/// Implemented by `ConnectionManager`; see its docs for the state machine.
#[cfg_attr(test, mockall::automock)]
pub trait Link {
    /// Connects, or disconnects when already connected.
    fn connect(&mut self, host: &str, port_text: &str) -> Result<ConnectOutcome, ConnectError>;

    /// Closes any open connection and returns a message naming it.
    fn disconnect(&mut self) -> String;

    /// Sends one message and waits briefly for one reply.
    fn send_message(&mut self, text: &str) -> Result<SendReport, SendError>;

    fn is_connected(&self) -> bool;
}

/// Line written when a send error left the link disconnected.
pub const CONNECTION_LOST: &str = "Connection lost";

/// A shell session: a link plus its message log.
pub struct ProbeSession<L: Link> {
    link: L,
    log: SessionLog,
}

impl<L: Link> ProbeSession<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            log: SessionLog::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Connects to `host:port_text`, or disconnects if already connected.
    pub fn connect(&mut self, host: &str, port_text: &str) -> Result<ConnectOutcome, ConnectError> {
        let result = self.link.connect(host, port_text);
        match &result {
            Ok(ConnectOutcome::Connected(report)) => {
                self.log.push(EntryKind::System, report.message());
            }
            Ok(ConnectOutcome::Disconnected { .. }) => {
                self.log.push(EntryKind::System, "Disconnected");
            }
            Err(e) => {
                self.log.push(EntryKind::Error, format!("✗ {e}"));
            }
        }
        result
    }

    /// Closes the connection.  Logged only when a link was actually open.
    pub fn disconnect(&mut self) -> String {
        let was_connected = self.link.is_connected();
        let message = self.link.disconnect();
        if was_connected {
            self.log.push(EntryKind::System, "Disconnected");
        }
        message
    }

    /// Sends `text` and records the exchange.
    ///
    /// An empty message is rejected by the link and leaves the log untouched.
    pub fn send(&mut self, text: &str) -> Result<SendReport, SendError> {
        let result = self.link.send_message(text);
        match &result {
            Ok(report) => {
                self.log.push(EntryKind::Sent, format!("SENT: {text}"));
                self.log.push(EntryKind::Confirm, format!("✓ {}", report.message()));
                if let Some(response) = &report.response {
                    self.log.push(EntryKind::Response, format!("RESPONSE: {response}"));
                }
            }
            Err(SendError::EmptyMessage) => {
                debug!("empty message ignored");
            }
            Err(e) => {
                self.log.push(EntryKind::Error, format!("✗ {e}"));
                if e.drops_connection() || !self.link.is_connected() {
                    self.log.push(EntryKind::System, CONNECTION_LOST);
                }
            }
        }
        result
    }

    /// Appends a free-form informational line.
    pub fn note(&mut self, text: impl Into<String>) {
        self.log.push(EntryKind::Info, text);
    }

    /// Exports the log to `path`.  See [`SessionLog::export_to`].
    pub fn export_log(&self, path: &Path) -> Result<usize, ExportError> {
        self.log.export_to(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
