//! Infrastructure layer.
//!
//! Contains OS-facing adapters: the TCP connection manager, local/remote host
//! inspection, route probes, TOML configuration storage, and the bridge that
//! exposes the application layer to the terminal shell.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `linxtap_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
pub mod ui_bridge;
