//! ConnectionManager: owns the single TCP connection and its state machine.
//!
//! # Connection lifecycle
//!
//! ```text
//!                connect(valid)
//!  Disconnected ───────────────────► Connected
//!       ▲                                │
//!       │  connect(any args)   (toggle)  │
//!       │  disconnect()                  │
//!       │  broken pipe / reset on send   │
//!       └────────────────────────────────┘
//! ```
//!
//! There is no terminal state; one manager serves any number of
//! connect/disconnect cycles.  Calling `connect` while connected closes the
//! current link and returns [`ConnectOutcome::Disconnected`] without touching
//! the newly supplied target.
//!
//! # Ownership
//!
//! The stream lives inside [`ConnectionState::Connected`], so "socket present"
//! and "endpoint present" are the same fact as "connected".  Dropping the
//! manager closes the socket.
//!
//! # Timeouts
//!
//! | Phase                    | Default |
//! |--------------------------|---------|
//! | TCP connect              | 5 s     |
//! | read window after send   | 1 s     |
//! | socket default (restored)| 5 s     |
//! | TTL probe connection     | 2 s     |

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use linxtap_core::{
    classify_os, ConnectError, ConnectOutcome, ConnectionReport, Endpoint, RemoteOs, SendError,
    SendReport,
};
use tracing::{debug, info, trace, warn};

use super::network_info::NetworkInfo;
use crate::application::probe_session::Link;

/// Timeouts and buffer sizes used by the connection manager.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Read/write timeout the socket carries between exchanges.
    pub default_timeout: Duration,
    /// How long to wait for a reply after a message was written.
    pub response_timeout: Duration,
    /// Bound on the extra connection used to observe the remote TTL.
    pub ttl_probe_timeout: Duration,
    /// Largest reply read in one exchange.
    pub recv_buffer_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            default_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(1),
            ttl_probe_timeout: Duration::from_secs(2),
            recv_buffer_bytes: 4096,
        }
    }
}

/// An open link and what was learned about its peer.
#[derive(Debug)]
struct ActiveConnection {
    stream: TcpStream,
    report: ConnectionReport,
}

/// The manager's finite state.
#[derive(Debug, Default)]
enum ConnectionState {
    #[default]
    Disconnected,
    Connected(ActiveConnection),
}

/// The connection manager.
///
/// Single-threaded and blocking: every call returns within its configured
/// timeouts.  Wrap it in a mutex to share it between threads.
pub struct ConnectionManager {
    config: NetworkConfig,
    network_info: Arc<NetworkInfo>,
    state: ConnectionState,
}

impl ConnectionManager {
    /// Creates a disconnected manager.
    pub fn new(config: NetworkConfig, network_info: Arc<NetworkInfo>) -> Self {
        Self {
            config,
            network_info,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Metadata of the current connection, if any.
    pub fn report(&self) -> Option<&ConnectionReport> {
        match &self.state {
            ConnectionState::Connected(active) => Some(&active.report),
            ConnectionState::Disconnected => None,
        }
    }

    pub fn remote_endpoint(&self) -> Option<&Endpoint> {
        self.report().map(|r| &r.endpoint)
    }

    pub fn remote_os(&self) -> Option<RemoteOs> {
        self.report().map(|r| r.remote_os)
    }

    pub fn is_gateway_device(&self) -> bool {
        self.report().is_some_and(|r| r.is_gateway)
    }

    pub fn network_info(&self) -> &NetworkInfo {
        &self.network_info
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Connects to `host:port_text`, or disconnects if already connected.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::InvalidInput`] for empty fields or a bad port; no
    ///   socket is created.
    /// - A transport variant when resolution or the TCP handshake fails.  The
    ///   manager stays disconnected and no socket remains open.
    pub fn connect(&mut self, host: &str, port_text: &str) -> Result<ConnectOutcome, ConnectError> {
        if self.is_connected() {
            let message = self.disconnect();
            return Ok(ConnectOutcome::Disconnected { message });
        }

        let endpoint = Endpoint::parse(host, port_text)?;

        let stream = match self.open_stream(&endpoint) {
            Ok(stream) => stream,
            Err(err) => {
                warn!("connect to {endpoint} failed: {err}");
                return Err(err);
            }
        };

        let report = self.enrich(endpoint);
        info!(
            "connected to {} (os={}, gateway={})",
            report.endpoint, report.remote_os, report.is_gateway
        );

        self.state = ConnectionState::Connected(ActiveConnection {
            stream,
            report: report.clone(),
        });
        Ok(ConnectOutcome::Connected(report))
    }

    /// Closes the connection if one is open and returns a message naming the
    /// previous endpoint.  Never fails.
    pub fn disconnect(&mut self) -> String {
        let previous = self.teardown();
        ConnectOutcome::disconnected_from(previous.as_ref()).message()
    }

    /// Writes `text` and waits briefly for one reply.
    ///
    /// A reply that does not arrive within the response window is not an
    /// error: the write already succeeded, so the report has no `response`.
    ///
    /// # Errors
    ///
    /// - [`SendError::EmptyMessage`] for `""`, checked before anything else.
    /// - [`SendError::NotConnected`] when no link is open.
    /// - [`SendError::BrokenPipe`] / [`SendError::ConnectionReset`] when the
    ///   peer went away; the manager is disconnected afterwards.
    /// - [`SendError::Transport`] for any other I/O error; the link is kept.
    pub fn send_message(&mut self, text: &str) -> Result<SendReport, SendError> {
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        let ConnectionState::Connected(active) = &self.state else {
            return Err(SendError::NotConnected);
        };

        let payload = text.as_bytes();
        match exchange(&active.stream, payload, &self.config) {
            Ok(response) => {
                trace!(
                    "sent {} bytes, received {} bytes",
                    payload.len(),
                    response.as_ref().map_or(0, String::len)
                );
                Ok(SendReport {
                    bytes_sent: payload.len(),
                    response,
                })
            }
            Err(e) => {
                let err = classify_send_error(&e);
                if err.drops_connection() {
                    warn!("link lost during send: {e}");
                    self.teardown();
                } else {
                    warn!("send failed: {e}");
                }
                Err(err)
            }
        }
    }

    /// Resolves and connects, trying each resolved address in turn.
    fn open_stream(&self, endpoint: &Endpoint) -> Result<TcpStream, ConnectError> {
        let addrs: Vec<SocketAddr> = match (endpoint.host.as_str(), endpoint.port).to_socket_addrs()
        {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                debug!("resolve {} failed: {e}", endpoint.host);
                return Err(ConnectError::InvalidAddress {
                    host: endpoint.host.clone(),
                });
            }
        };
        if addrs.is_empty() {
            return Err(ConnectError::InvalidAddress {
                host: endpoint.host.clone(),
            });
        }

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.config.default_timeout))
                        .and_then(|()| stream.set_write_timeout(Some(self.config.default_timeout)))
                        .map_err(|e| ConnectError::Os(e.to_string()))?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("connect to {addr} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => classify_connect_error(endpoint, &e),
            None => ConnectError::Unexpected("no address attempted".to_string()),
        })
    }

    /// Best-effort OS guess and gateway check.  Never fails.
    fn enrich(&self, endpoint: Endpoint) -> ConnectionReport {
        let is_gateway = self.network_info.is_gateway(&endpoint.host);
        let ttl = self.network_info.get_remote_ttl(
            &endpoint.host,
            endpoint.port,
            self.config.ttl_probe_timeout,
        );
        let remote_os = ttl.map(classify_os).unwrap_or(RemoteOs::Unknown);
        debug!("enrichment for {endpoint}: ttl={ttl:?} gateway={is_gateway}");

        ConnectionReport {
            endpoint,
            remote_os,
            ttl,
            is_gateway,
        }
    }

    /// Moves to `Disconnected`, closing the socket if one was open.
    /// Returns the endpoint that was connected.
    fn teardown(&mut self) -> Option<Endpoint> {
        match std::mem::take(&mut self.state) {
            ConnectionState::Connected(active) => {
                if let Err(e) = active.stream.shutdown(Shutdown::Both) {
                    debug!("shutdown of {} ignored: {e}", active.report.endpoint);
                }
                info!("disconnected from {}", active.report.endpoint);
                Some(active.report.endpoint)
            }
            ConnectionState::Disconnected => None,
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Link for ConnectionManager {
    fn connect(&mut self, host: &str, port_text: &str) -> Result<ConnectOutcome, ConnectError> {
        ConnectionManager::connect(self, host, port_text)
    }

    fn disconnect(&mut self) -> String {
        ConnectionManager::disconnect(self)
    }

    fn send_message(&mut self, text: &str) -> Result<SendReport, SendError> {
        ConnectionManager::send_message(self, text)
    }

    fn is_connected(&self) -> bool {
        ConnectionManager::is_connected(self)
    }
}

// ── Exchange helpers ──────────────────────────────────────────────────────────

/// Sets a read timeout for the lifetime of the guard and restores the
/// default on drop, on every exit path.
struct ScopedReadTimeout<'a> {
    stream: &'a TcpStream,
    restore: Duration,
}

impl<'a> ScopedReadTimeout<'a> {
    fn new(stream: &'a TcpStream, window: Duration, restore: Duration) -> io::Result<Self> {
        stream.set_read_timeout(Some(window))?;
        Ok(Self { stream, restore })
    }
}

impl Drop for ScopedReadTimeout<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.stream.set_read_timeout(Some(self.restore)) {
            debug!("restoring read timeout failed: {e}");
        }
    }
}

/// Writes the whole payload, then reads at most one reply within the
/// response window.  A timeout or an orderly close yields `Ok(None)`.
fn exchange(stream: &TcpStream, payload: &[u8], config: &NetworkConfig) -> io::Result<Option<String>> {
    let mut writer = stream;
    writer.write_all(payload)?;
    writer.flush()?;

    let _window = ScopedReadTimeout::new(stream, config.response_timeout, config.default_timeout)?;
    let mut buf = vec![0u8; config.recv_buffer_bytes.max(1)];
    let mut reader = stream;
    match reader.read(&mut buf) {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(String::from_utf8_lossy(&buf[..n]).into_owned())),
        Err(e) if is_timeout_error(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Returns `true` for OS timeout / would-block errors.
fn is_timeout_error(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Maps a failed TCP handshake to the user-facing error.
fn classify_connect_error(endpoint: &Endpoint, e: &io::Error) -> ConnectError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => ConnectError::Timeout {
            endpoint: endpoint.clone(),
        },
        ErrorKind::ConnectionRefused => ConnectError::Refused {
            endpoint: endpoint.clone(),
        },
        _ if e.raw_os_error().is_some() => ConnectError::Os(e.to_string()),
        _ => ConnectError::Unexpected(e.to_string()),
    }
}

/// Maps a failed exchange to the user-facing error.
fn classify_send_error(e: &io::Error) -> SendError {
    match e.kind() {
        ErrorKind::BrokenPipe => SendError::BrokenPipe,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => SendError::ConnectionReset,
        _ => SendError::Transport(e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
