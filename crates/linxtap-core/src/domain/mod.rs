//! Domain types for LinxTap.
//!
//! Pure rules with no infrastructure dependencies.  Code in the `linxtap`
//! crate (sockets, subprocesses, the terminal shell) depends on these types,
//! but nothing here depends on it, so every rule can be unit-tested on any
//! platform without network access.

/// Host/port pair and the validation applied to user input.
pub mod endpoint;

/// Operating-system guess derived from an observed TTL.
pub mod os_guess;

/// Results and errors of the connect and send operations.
pub mod outcome;
