//! # linxtap-core
//!
//! Shared library for LinxTap containing the pure parts of the single-connection
//! TCP probe: endpoint validation, the TTL-based operating-system guess, the
//! typed outcomes of connect/send, and the parsers that turn routing-table and
//! ping text into structured values.
//!
//! This crate has zero dependencies on sockets, subprocesses, or the file
//! system.  Everything that touches the OS lives in the `linxtap` crate.
//!
//! # Architecture overview
//!
//! LinxTap opens one TCP connection to a user-chosen `host:port`, optionally
//! sends a text message and reads one reply, and reports best-effort facts
//! about the remote host (an OS guess from its TTL and whether it is the local
//! default gateway).
//!
//! - **`domain`** – Value types and rules: [`Endpoint`] parsing, [`RemoteOs`]
//!   classification, and the [`ConnectOutcome`] / [`SendReport`] result types
//!   together with their error enums.
//!
//! - **`routing`** – Text parsers for `ip route`, `route -n get`,
//!   `/proc/net/route`, `ipconfig`, `route print`, and `ping` output.  The
//!   platform probes in `linxtap` feed raw command output through these and
//!   only ever hand structured results to callers.

pub mod domain;
pub mod routing;

// Re-export the most-used types at the crate root so callers can write
// `linxtap_core::Endpoint` instead of `linxtap_core::domain::endpoint::Endpoint`.
pub use domain::endpoint::{Endpoint, InputError};
pub use domain::os_guess::{classify_os, RemoteOs};
pub use domain::outcome::{ConnectError, ConnectOutcome, ConnectionReport, SendError, SendReport};
