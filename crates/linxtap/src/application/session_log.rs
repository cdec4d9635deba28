//! SessionLog: the timestamped message log a shell session accumulates.
//!
//! Every step the user takes (connect, send, reply, error) is appended as a
//! [`LogEntry`].  The log lives only in memory; it is written to disk only
//! when the user explicitly exports it.
//!
//! # Text format
//!
//! One entry per line, prefixed with its wall-clock time:
//!
//! ```text
//! [14:03:07] Connected to 192.168.1.20:8080
//! [14:03:09] SENT: ping
//! [14:03:09] ✓ Sent 4 bytes
//! [14:03:09] RESPONSE: pong
//! ```

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Prefix of default export file names.
const EXPORT_FILE_PREFIX: &str = "linxtap_log_";

/// What produced a log entry.  Drives styling in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Text the user sent.
    Sent,
    /// Text the remote host answered.
    Response,
    /// Positive acknowledgement, e.g. "✓ Sent 4 bytes".
    Confirm,
    Error,
    /// Connection state transitions.
    System,
    Info,
}

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub kind: EntryKind,
    pub text: String,
}

impl LogEntry {
    /// Renders the entry as `[HH:MM:SS] text`.
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// Errors from [`SessionLog::export_to`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no messages to export")]
    EmptyLog,
    #[error("failed to export log: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, append-only collection of log entries.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry stamped with the current local time.
    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.push_at(Local::now().naive_local(), kind, text);
    }

    /// Appends an entry with an explicit timestamp.
    pub fn push_at(&mut self, timestamp: NaiveDateTime, kind: EntryKind, text: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp,
            kind,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries rendered one per line, each line newline-terminated.
    pub fn render_plain(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}\n", e.render()))
            .collect()
    }

    /// Writes the rendered log to `path`, replacing any existing file.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// - [`ExportError::EmptyLog`] when there is nothing to write; no file is
    ///   created.
    /// - [`ExportError::Io`] when the file cannot be written.
    pub fn export_to(&self, path: &Path) -> Result<usize, ExportError> {
        if self.entries.is_empty() {
            return Err(ExportError::EmptyLog);
        }
        fs::write(path, self.render_plain())?;
        Ok(self.entries.len())
    }
}

/// Default export file name for a log exported at `now`:
/// `linxtap_log_YYYYMMDD_HHMMSS.txt`.
pub fn default_export_file_name(now: NaiveDateTime) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.txt", now.format("%Y%m%d_%H%M%S"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid timestamp")
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = SessionLog::new();
        assert!(log.is_empty());
        assert_eq!(log.render_plain(), "");
    }

    #[test]
    fn test_push_at_keeps_insertion_order() {
        // Arrange
        let mut log = SessionLog::new();

        // Act
        log.push_at(at(9, 0, 1), EntryKind::System, "Connected to 10.0.0.1:80");
        log.push_at(at(9, 0, 2), EntryKind::Sent, "SENT: hi");

        // Assert
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].kind, EntryKind::System);
        assert_eq!(log.entries()[1].text, "SENT: hi");
    }

    #[test]
    fn test_render_plain_prefixes_each_line_with_time() {
        let mut log = SessionLog::new();
        log.push_at(at(14, 3, 7), EntryKind::System, "Connected to 192.168.1.20:8080");
        log.push_at(at(14, 3, 9), EntryKind::Response, "RESPONSE: pong");

        assert_eq!(
            log.render_plain(),
            "[14:03:07] Connected to 192.168.1.20:8080\n[14:03:09] RESPONSE: pong\n"
        );
    }

    #[test]
    fn test_push_stamps_current_time() {
        let before = Local::now().naive_local();
        let mut log = SessionLog::new();
        log.push(EntryKind::Info, "hello");
        let after = Local::now().naive_local();

        let ts = log.entries()[0].timestamp;
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn test_export_to_writes_rendered_log() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.txt");
        let mut log = SessionLog::new();
        log.push_at(at(8, 30, 0), EntryKind::Sent, "SENT: ping");

        // Act
        let written = log.export_to(&path).expect("export");

        // Assert
        assert_eq!(written, 1);
        let text = fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "[08:30:00] SENT: ping\n");
    }

    #[test]
    fn test_export_to_refuses_empty_log_and_creates_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.txt");

        let result = SessionLog::new().export_to(&path);

        assert!(matches!(result, Err(ExportError::EmptyLog)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no").join("such").join("dir.txt");
        let mut log = SessionLog::new();
        log.push(EntryKind::Info, "x");

        assert!(matches!(log.export_to(&path), Err(ExportError::Io(_))));
    }

    #[test]
    fn test_default_export_file_name_format() {
        assert_eq!(
            default_export_file_name(at(14, 3, 7)),
            "linxtap_log_20240309_140307.txt"
        );
    }

    #[test]
    fn test_entry_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntryKind::Response).expect("serialize");
        assert_eq!(json, "\"response\"");
    }
}
