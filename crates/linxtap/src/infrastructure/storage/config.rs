//! TOML-based configuration for the linxtap shell.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate path:
//! - Windows:  `%APPDATA%\LinxTap\config.toml`
//! - Linux:    `~/.config/linxtap/config.toml`
//! - macOS:    `~/Library/Application Support/LinxTap/config.toml`
//!
//! The `--config <path>` flag replaces the platform path with
//! [`load_config_from`] / [`save_config_to`].
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [probe]
//! connect_timeout_secs = 5
//! response_timeout_ms = 1000
//! ```
//!
//! Every field has a serde default, so a missing file, an empty file, and a
//! file with only some keys all load.  Only tuning lives here; connection
//! state is never written to disk.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::connection_manager::NetworkConfig;
use crate::infrastructure::network::network_info::DEFAULT_LOCAL_IP_TARGET;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Shell-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for `export` without an explicit path.  Current directory
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

/// Connection timeouts and probe tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Socket timeout restored after each exchange.
    #[serde(default = "default_default_timeout_secs")]
    pub default_timeout_secs: u64,
    /// Read window after a message is sent.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    #[serde(default = "default_ttl_probe_timeout_secs")]
    pub ttl_probe_timeout_secs: u64,
    /// Bound on `ip`, `route`, `ipconfig` and `ping` subprocesses.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_recv_buffer_bytes")]
    pub recv_buffer_bytes: usize,
    /// Address used to select the outbound interface for the local IP.
    #[serde(default = "default_local_ip_probe_target")]
    pub local_ip_probe_target: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_default_timeout_secs() -> u64 {
    5
}
fn default_response_timeout_ms() -> u64 {
    1000
}
fn default_ttl_probe_timeout_secs() -> u64 {
    2
}
fn default_command_timeout_secs() -> u64 {
    3
}
fn default_recv_buffer_bytes() -> usize {
    4096
}
fn default_local_ip_probe_target() -> String {
    DEFAULT_LOCAL_IP_TARGET.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            export_dir: None,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            default_timeout_secs: default_default_timeout_secs(),
            response_timeout_ms: default_response_timeout_ms(),
            ttl_probe_timeout_secs: default_ttl_probe_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            recv_buffer_bytes: default_recv_buffer_bytes(),
            local_ip_probe_target: default_local_ip_probe_target(),
        }
    }
}

impl ProbeConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    /// The configured local-IP target, or the built-in default when the
    /// text is not a socket address.
    pub fn local_ip_target(&self) -> SocketAddr {
        self.local_ip_probe_target
            .parse()
            .unwrap_or(DEFAULT_LOCAL_IP_TARGET)
    }
}

impl From<&ProbeConfig> for NetworkConfig {
    /// Zero durations are raised to the smallest usable value; std sockets
    /// reject a zero timeout.
    fn from(p: &ProbeConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(p.connect_timeout_secs.max(1)),
            default_timeout: Duration::from_secs(p.default_timeout_secs.max(1)),
            response_timeout: Duration::from_millis(p.response_timeout_ms.max(1)),
            ttl_probe_timeout: Duration::from_secs(p.ttl_probe_timeout_secs.max(1)),
            recv_buffer_bytes: p.recv_buffer_bytes.max(1),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`AppConfig`] from the platform path.  See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads [`AppConfig`] from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to the platform path.  See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `linxtap` segment.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("LinxTap"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("linxtap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("LinxTap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_timeouts() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.probe.connect_timeout_secs, 5);
        assert_eq!(cfg.probe.default_timeout_secs, 5);
        assert_eq!(cfg.probe.response_timeout_ms, 1000);
        assert_eq!(cfg.probe.ttl_probe_timeout_secs, 2);
        assert_eq!(cfg.probe.command_timeout_secs, 3);
        assert_eq!(cfg.general.log_level, "info");
        assert!(cfg.general.export_dir.is_none());
    }

    #[test]
    fn test_probe_config_converts_to_network_config_defaults() {
        let net = NetworkConfig::from(&ProbeConfig::default());
        assert_eq!(net, NetworkConfig::default());
    }

    #[test]
    fn test_probe_config_zero_values_are_clamped() {
        let probe = ProbeConfig {
            connect_timeout_secs: 0,
            response_timeout_ms: 0,
            recv_buffer_bytes: 0,
            ..ProbeConfig::default()
        };

        let net = NetworkConfig::from(&probe);

        assert_eq!(net.connect_timeout, Duration::from_secs(1));
        assert_eq!(net.response_timeout, Duration::from_millis(1));
        assert_eq!(net.recv_buffer_bytes, 1);
    }

    #[test]
    fn test_local_ip_target_falls_back_on_garbage() {
        let probe = ProbeConfig {
            local_ip_probe_target: "not an address".to_string(),
            ..ProbeConfig::default()
        };
        assert_eq!(probe.local_ip_target(), DEFAULT_LOCAL_IP_TARGET);

        let probe = ProbeConfig {
            local_ip_probe_target: "1.1.1.1:53".to_string(),
            ..ProbeConfig::default()
        };
        assert_eq!(probe.local_ip_target().to_string(), "1.1.1.1:53");
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.probe.response_timeout_ms = 250;
        cfg.general.export_dir = Some(PathBuf::from("/tmp/logs"));

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_probe_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[probe]
connect_timeout_secs = 10
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.probe.connect_timeout_secs, 10);
        assert_eq!(cfg.probe.response_timeout_ms, 1000);
        assert_eq!(cfg.general.log_level, "info");
    }

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").expect("write");

        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_config_to_creates_parent_and_round_trips() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.general.log_level = "debug".to_string();

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
