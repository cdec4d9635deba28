//! Shell bridge: exposes the probe session to the terminal front-end.
//!
//! The terminal shell in `main.rs` reads a line, parses it into a
//! [`ShellCommand`], and hands it to [`run_command`], which executes it on
//! Tokio's blocking pool against the shared [`ShellState`].  The resulting
//! [`Reply`] is printed either as human-readable text or as JSON (`--json`).
//!
//! # Data Transfer Objects
//!
//! The JSON shapes are the presentation contract of the connection core:
//!
//! ```text
//! connect -> { "status": "connected"|"disconnected"|"error", "message": "...",
//!              "remoteOS"?: "Linux/Unix", "isGateway"?: false }
//! send    -> { "status": "success"|"error", "message": "...",
//!              "bytesSent"?: 4, "response"?: "pong" }
//! ```
//!
//! Optional keys are omitted rather than serialised as `null`.  The other
//! commands answer with the [`CommandResult`] wrapper
//! `{ success, data, error }`.
//!
//! # Why every command runs in `spawn_blocking`
//!
//! Connect, send, and the route probes block for up to several seconds.
//! Running them on the blocking pool keeps the shell's `select!` loop free to
//! react to Ctrl-C while a connect is in flight.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use linxtap_core::{ConnectError, ConnectOutcome, SendError, SendReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::application::probe_session::ProbeSession;
use crate::application::session_log::{default_export_file_name, LogEntry};
use crate::infrastructure::network::connection_manager::{ConnectionManager, NetworkConfig};
use crate::infrastructure::network::network_info::{NetworkInfo, UNKNOWN};
use crate::infrastructure::storage::config::AppConfig;

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// Result of `connect`, in the presentation contract's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub status: String,
    pub message: String,
    #[serde(rename = "remoteOS", default, skip_serializing_if = "Option::is_none")]
    pub remote_os: Option<String>,
    #[serde(rename = "isGateway", default, skip_serializing_if = "Option::is_none")]
    pub is_gateway: Option<bool>,
}

impl From<&Result<ConnectOutcome, ConnectError>> for ConnectResponse {
    fn from(result: &Result<ConnectOutcome, ConnectError>) -> Self {
        match result {
            Ok(ConnectOutcome::Connected(report)) => Self {
                status: "connected".to_string(),
                message: report.message(),
                remote_os: Some(report.remote_os.to_string()),
                is_gateway: Some(report.is_gateway),
            },
            Ok(ConnectOutcome::Disconnected { message }) => Self::disconnected(message.clone()),
            Err(e) => Self {
                status: "error".to_string(),
                message: e.to_string(),
                remote_os: None,
                is_gateway: None,
            },
        }
    }
}

impl ConnectResponse {
    fn disconnected(message: String) -> Self {
        Self {
            status: "disconnected".to_string(),
            message,
            remote_os: None,
            is_gateway: None,
        }
    }
}

/// Result of `send`, in the presentation contract's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub status: String,
    pub message: String,
    #[serde(rename = "bytesSent", default, skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl From<&Result<SendReport, SendError>> for SendResponse {
    fn from(result: &Result<SendReport, SendError>) -> Self {
        match result {
            Ok(report) => Self {
                status: "success".to_string(),
                message: report.message(),
                bytes_sent: Some(report.bytes_sent),
                response: report.response.clone(),
            },
            Err(e) => Self {
                status: "error".to_string(),
                message: e.to_string(),
                bytes_sent: None,
                response: None,
            },
        }
    }
}

/// Current connection state for `status` and post-error reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDto {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(rename = "remoteOS", skip_serializing_if = "Option::is_none")]
    pub remote_os: Option<String>,
    #[serde(rename = "isGateway")]
    pub is_gateway: bool,
}

/// Facts about this machine for the `info` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInfoDto {
    pub hostname: String,
    #[serde(rename = "localIP")]
    pub local_ip: String,
    /// Gateway address, or `"Unknown"`.
    pub gateway: String,
}

/// Result of `export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDto {
    pub path: String,
    pub entries: usize,
}

/// Unified response wrapper for commands outside the connect/send contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Command parsing ───────────────────────────────────────────────────────────

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `connect <host> <port>`; missing arguments are passed on empty so the
    /// core reports them.
    Connect { host: String, port: String },
    Disconnect,
    /// `send <text>`; everything after the first space, verbatim.
    Send { text: String },
    Status,
    Info,
    Log,
    /// `export [path]`
    Export { path: Option<PathBuf> },
    Help,
    Quit,
}

/// Rejected shell input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("too many arguments for `{0}`")]
    TooManyArguments(&'static str),
}

impl ShellCommand {
    /// Parses one input line.  Command names are case-insensitive.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let line = line.trim_start_matches([' ', '\t']).trim_end_matches(['\r', '\n']);
        let (name, rest) = match line.split_once([' ', '\t']) {
            Some((name, rest)) => (name, rest),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "connect" => {
                let host = args.next().unwrap_or_default().to_string();
                let port = args.next().unwrap_or_default().to_string();
                no_more(args, "connect")?;
                Ok(ShellCommand::Connect { host, port })
            }
            "disconnect" => no_more(args, "disconnect").map(|()| ShellCommand::Disconnect),
            "send" => Ok(ShellCommand::Send {
                text: rest.to_string(),
            }),
            "status" => no_more(args, "status").map(|()| ShellCommand::Status),
            "info" => no_more(args, "info").map(|()| ShellCommand::Info),
            "log" => no_more(args, "log").map(|()| ShellCommand::Log),
            "export" => {
                let rest = rest.trim();
                Ok(ShellCommand::Export {
                    path: (!rest.is_empty()).then(|| PathBuf::from(rest)),
                })
            }
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

fn no_more<'a>(
    mut args: impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<(), CommandParseError> {
    match args.next() {
        Some(_) => Err(CommandParseError::TooManyArguments(command)),
        None => Ok(()),
    }
}

pub const HELP_TEXT: &str = "\
commands:
  connect <host> <port>   connect, or disconnect if already connected
  disconnect              close the current connection
  send <text>             send text and wait up to the response window for a reply
  status                  show the connection state
  info                    show hostname, local IP and default gateway
  log                     print the message log
  export [path]           write the message log to a text file
  help                    show this list
  quit                    leave the shell";

// ── Replies ───────────────────────────────────────────────────────────────────

/// What a dispatched command produced.
#[derive(Debug)]
pub enum Reply {
    Connect(ConnectResponse),
    Send(SendResponse),
    Status(StatusDto),
    Info(LocalInfoDto),
    Log(Vec<LogEntry>),
    Export(CommandResult<ExportDto>),
    Help,
    Quit,
}

impl Reply {
    /// Whether the shell should exit after printing this reply.
    pub fn is_quit(&self) -> bool {
        matches!(self, Reply::Quit)
    }

    /// JSON rendering of the reply's DTO.
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Reply::Connect(r) => serde_json::to_string(r),
            Reply::Send(r) => serde_json::to_string(r),
            Reply::Status(r) => serde_json::to_string(&CommandResult::ok(r)),
            Reply::Info(r) => serde_json::to_string(&CommandResult::ok(r)),
            Reply::Log(entries) => serde_json::to_string(&CommandResult::ok(entries)),
            Reply::Export(r) => serde_json::to_string(r),
            Reply::Help => serde_json::to_string(&CommandResult::ok(HELP_TEXT)),
            Reply::Quit => serde_json::to_string(&CommandResult::ok("bye")),
        }
    }

    /// Human-readable rendering, without a trailing newline.
    pub fn render_text(&self) -> String {
        match self {
            Reply::Connect(r) => render_connect(r),
            Reply::Send(r) => render_send(r),
            Reply::Status(s) => render_status(s),
            Reply::Info(i) => format!(
                "Hostname: {}\nLocal IP: {}\nGateway:  {}",
                i.hostname, i.local_ip, i.gateway
            ),
            Reply::Log(entries) if entries.is_empty() => "(log is empty)".to_string(),
            Reply::Log(entries) => entries
                .iter()
                .map(LogEntry::render)
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Export(r) => match (&r.data, &r.error) {
                (Some(d), _) => format!("✓ Exported {} messages to {}", d.entries, d.path),
                (None, Some(e)) => format!("✗ {e}"),
                (None, None) => String::new(),
            },
            Reply::Help => HELP_TEXT.to_string(),
            Reply::Quit => "bye".to_string(),
        }
    }
}

fn render_connect(r: &ConnectResponse) -> String {
    match r.status.as_str() {
        "connected" => {
            let mut out = format!("● {}", r.message);
            if let Some(os) = &r.remote_os {
                let _ = write!(out, "\n  Remote OS:   {os}");
            }
            let device = if r.is_gateway == Some(true) {
                "Gateway (Router)"
            } else {
                "Network Device"
            };
            let _ = write!(out, "\n  Device type: {device}");
            out
        }
        "disconnected" => format!("○ {}", r.message),
        _ => format!("✗ {}", r.message),
    }
}

fn render_send(r: &SendResponse) -> String {
    if r.status != "success" {
        return format!("✗ {}", r.message);
    }
    match &r.response {
        Some(resp) => format!("✓ {}\nRESPONSE: {resp}", r.message),
        None => format!("✓ {}", r.message),
    }
}

fn render_status(s: &StatusDto) -> String {
    match (&s.endpoint, s.connected) {
        (Some(ep), true) => format!(
            "● Connected to {ep}\n  Remote OS:   {}\n  Device type: {}",
            s.remote_os.as_deref().unwrap_or(UNKNOWN),
            if s.is_gateway {
                "Gateway (Router)"
            } else {
                "Network Device"
            }
        ),
        _ => "○ Not connected".to_string(),
    }
}

// ── Shared shell state ────────────────────────────────────────────────────────

/// Everything one shell session owns.
pub struct ShellState {
    session: ProbeSession<ConnectionManager>,
    export_dir: Option<PathBuf>,
}

impl ShellState {
    pub fn new(manager: ConnectionManager, export_dir: Option<PathBuf>) -> Self {
        Self {
            session: ProbeSession::new(manager),
            export_dir,
        }
    }

    /// Builds the state with native route probing, tuned by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let info = NetworkInfo::native(config.probe.command_timeout())
            .with_local_ip_target(config.probe.local_ip_target());
        let manager = ConnectionManager::new(NetworkConfig::from(&config.probe), Arc::new(info));
        Self::new(manager, config.general.export_dir.clone())
    }

    pub fn session(&self) -> &ProbeSession<ConnectionManager> {
        &self.session
    }

    /// Executes one command.  Blocking; see [`run_command`].
    pub fn dispatch(&mut self, command: ShellCommand) -> Reply {
        match command {
            ShellCommand::Connect { host, port } => {
                Reply::Connect(ConnectResponse::from(&self.session.connect(&host, &port)))
            }
            ShellCommand::Disconnect => {
                Reply::Connect(ConnectResponse::disconnected(self.session.disconnect()))
            }
            ShellCommand::Send { text } => Reply::Send(SendResponse::from(&self.session.send(&text))),
            ShellCommand::Status => Reply::Status(self.status()),
            ShellCommand::Info => Reply::Info(self.local_info()),
            ShellCommand::Log => Reply::Log(self.session.log().entries().to_vec()),
            ShellCommand::Export { path } => Reply::Export(self.export(path)),
            ShellCommand::Help => Reply::Help,
            ShellCommand::Quit => {
                if self.session.is_connected() {
                    self.session.disconnect();
                }
                Reply::Quit
            }
        }
    }

    pub fn status(&self) -> StatusDto {
        let manager = self.session.link();
        StatusDto {
            connected: manager.is_connected(),
            endpoint: manager.remote_endpoint().map(ToString::to_string),
            remote_os: manager.remote_os().map(|os| os.to_string()),
            is_gateway: manager.is_gateway_device(),
        }
    }

    pub fn local_info(&self) -> LocalInfoDto {
        let info = self.session.link().network_info();
        LocalInfoDto {
            hostname: info.get_hostname(),
            local_ip: info.get_local_ip(),
            gateway: info
                .get_default_gateway()
                .map_or_else(|| UNKNOWN.to_string(), |gw| gw.to_string()),
        }
    }

    fn export(&self, path: Option<PathBuf>) -> CommandResult<ExportDto> {
        let path = path.unwrap_or_else(|| {
            let name = default_export_file_name(Local::now().naive_local());
            match &self.export_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        });
        match self.session.export_log(&path) {
            Ok(entries) => CommandResult::ok(ExportDto {
                path: path.display().to_string(),
                entries,
            }),
            Err(e) => CommandResult::err(e.to_string()),
        }
    }
}

/// Runs `command` on the blocking pool against the shared state.
///
/// # Errors
///
/// Returns the [`tokio::task::JoinError`] if the blocking task panicked.
pub async fn run_command(
    state: Arc<Mutex<ShellState>>,
    command: ShellCommand,
) -> Result<Reply, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || state.blocking_lock().dispatch(command)).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
