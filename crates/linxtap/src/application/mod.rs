//! Application layer use cases.
//!
//! Use cases here orchestrate a connection through the [`probe_session::Link`]
//! abstraction and never touch sockets directly, so they are tested with a
//! mocked link.
//!
//! # Sub-modules
//!
//! - **`probe_session`** – What the presentation shell drives: connect, send,
//!   disconnect, export.  Every step is recorded in the session log.
//!
//! - **`session_log`** – Timestamped, typed message log with plain-text
//!   rendering and export to a `.txt` file.

pub mod probe_session;
pub mod session_log;
