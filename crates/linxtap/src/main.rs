//! linxtap terminal shell: entry point.
//!
//! Two modes:
//!
//! ```text
//! linxtap                                        interactive shell
//! linxtap --host 10.0.0.5 --port 23 -m "hello"   one-shot: connect, send, exit
//! linxtap --init-config                          write default config and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load AppConfig (--config or platform path)
//!  └─ ShellState::from_config()   -- ConnectionManager + native NetworkInfo
//!  └─ loop
//!       ├─ stdin line ──► ShellCommand::parse ──► run_command (blocking pool)
//!       └─ Ctrl-C     ──► leave loop, connection closed on drop
//! ```
//!
//! Logs go to stderr; stdout carries only shell output so `--json` output can
//! be piped.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use linxtap::infrastructure::storage::config::{
    config_file_path, load_config, load_config_from, save_config_to, AppConfig,
};
use linxtap::infrastructure::ui_bridge::{run_command, Reply, ShellCommand, ShellState};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Single-connection TCP probe.
///
/// Without `--host`, starts an interactive shell; type `help` there for the
/// command list.
#[derive(Debug, Parser)]
#[command(
    name = "linxtap",
    about = "Connect to one TCP endpoint, send a message, read the reply, guess the remote OS",
    version
)]
struct Cli {
    /// Remote host (IP address or name) for one-shot mode.
    #[arg(long, env = "LINXTAP_HOST")]
    host: Option<String>,

    /// Remote TCP port for one-shot mode.
    ///
    /// Taken as text so out-of-range values get the same message as in the
    /// shell.
    #[arg(long, env = "LINXTAP_PORT")]
    port: Option<String>,

    /// Message to send after connecting in one-shot mode.
    #[arg(long, short)]
    message: Option<String>,

    /// Print replies as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Config file to use instead of the platform default.
    #[arg(long, env = "LINXTAP_CONFIG")]
    config: Option<PathBuf>,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Config is read before logging starts because it supplies the level.
    let loaded = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    let level = loaded
        .as_ref()
        .map(|c| c.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!("using default configuration: {e}");
            AppConfig::default()
        }
    };

    if cli.init_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => config_file_path().context("resolving config path")?,
        };
        save_config_to(&AppConfig::default(), &path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote default configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let state = Arc::new(Mutex::new(ShellState::from_config(&config)));

    if cli.host.is_some() || cli.port.is_some() {
        return one_shot(state, cli).await;
    }
    interactive(state, cli.json).await
}

/// Connect, optionally send one message, disconnect.
async fn one_shot(state: Arc<Mutex<ShellState>>, cli: Cli) -> anyhow::Result<ExitCode> {
    let connect = ShellCommand::Connect {
        host: cli.host.unwrap_or_default(),
        port: cli.port.unwrap_or_default(),
    };
    let reply = run_command(Arc::clone(&state), connect)
        .await
        .context("connect task failed")?;
    emit(&reply, cli.json)?;
    let connected = matches!(&reply, Reply::Connect(r) if r.status == "connected");
    if !connected {
        return Ok(ExitCode::FAILURE);
    }

    let mut code = ExitCode::SUCCESS;
    if let Some(text) = cli.message {
        let reply = run_command(Arc::clone(&state), ShellCommand::Send { text })
            .await
            .context("send task failed")?;
        emit(&reply, cli.json)?;
        if matches!(&reply, Reply::Send(r) if r.status != "success") {
            code = ExitCode::FAILURE;
        }
    }

    run_command(state, ShellCommand::Disconnect)
        .await
        .context("disconnect task failed")?;
    Ok(code)
}

/// Line-oriented shell on stdin until `quit`, EOF, or Ctrl-C.
async fn interactive(state: Arc<Mutex<ShellState>>, json: bool) -> anyhow::Result<ExitCode> {
    info!("linxtap shell ready");
    if !json {
        println!("LinxTap - type `help` for commands");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(json)?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("✗ {e}");
                continue;
            }
        };

        let reply = tokio::select! {
            reply = run_command(Arc::clone(&state), command) => reply.context("command task failed")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted while a command was running");
                break;
            }
        };
        emit(&reply, json)?;
        if reply.is_quit() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    run_command(state, ShellCommand::Quit)
        .await
        .context("shutdown task failed")?;
    Ok(ExitCode::SUCCESS)
}

fn prompt(json: bool) -> anyhow::Result<()> {
    if json {
        return Ok(());
    }
    let mut out = std::io::stdout();
    write!(out, "linxtap> ")?;
    out.flush()?;
    Ok(())
}

fn emit(reply: &Reply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", reply.to_json().context("encoding reply")?);
    } else {
        println!("{}", reply.render_text());
    }
    Ok(())
}
