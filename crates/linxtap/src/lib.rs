//! linxtap library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does linxtap do?
//!
//! linxtap opens a single TCP connection to a user-chosen `host:port`,
//! optionally sends one text message and reads one reply, and shows
//! best-effort facts about the remote host:
//!
//! 1. An operating-system guess derived from the remote TTL.
//! 2. Whether the remote host is this machine's default gateway.
//!
//! All network calls are blocking and bounded by timeouts.  The terminal
//! shell in `main.rs` runs them on Tokio's blocking pool so its own input
//! loop stays responsive.

/// Application layer: the probe session use case and its message log.
pub mod application;

/// Infrastructure layer: sockets, route probes, configuration, shell bridge.
pub mod infrastructure;
