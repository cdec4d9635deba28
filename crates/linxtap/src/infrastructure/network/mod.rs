//! Network infrastructure.
//!
//! # Sub-modules
//!
//! - **`connection_manager`** – Owns at most one TCP stream.  Implements the
//!   connect (toggle) / send / disconnect state machine and enriches each new
//!   connection with an OS guess and a gateway check.
//!
//! - **`network_info`** – Local hostname and IP, default gateway, remote TTL.
//!   Every lookup degrades to `"Unknown"` / `None` instead of failing.
//!
//! - **`route_probe`** – Platform-specific discovery of the default gateway
//!   and ping-based TTL, behind the [`route_probe::RouteProbe`] trait.

pub mod connection_manager;
pub mod network_info;
pub mod route_probe;
