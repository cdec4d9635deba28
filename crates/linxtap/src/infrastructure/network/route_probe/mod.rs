//! Platform-specific default-gateway and ping-TTL discovery.
//!
//! Both lookups depend on the OS: the gateway lives in a kernel table or in
//! the output of a routing utility, and the ping utility takes different
//! flags per platform.  Each platform implements [`RouteProbe`]; the correct
//! one is selected at compile time via `#[cfg(...)]` and re-exported as
//! `NativeRouteProbe`:
//!
//! | Module    | OS      | Gateway source                                   | Ping        |
//! |-----------|---------|--------------------------------------------------|-------------|
//! | `posix`   | Unix    | `ip route`, `route -n get`, `/proc/net/route`    | `ping -c 1` |
//! | `windows` | Windows | `ipconfig`, `route print 0.0.0.0`                | `ping -n 1` |
//!
//! Implementations never return raw text: command output goes through the
//! parsers in [`linxtap_core::routing`] and comes back as a structured
//! `Option`.  Every subprocess or file error is swallowed and logged at
//! `debug` level.
//!
//! A [`StaticRouteProbe`] is always compiled (not guarded by `#[cfg]`) so
//! tests on any platform can inject fixed answers.

use std::net::Ipv4Addr;
use std::time::Duration;

pub mod command;
pub mod mock;

pub use mock::StaticRouteProbe;

/// Gateway and TTL discovery for the current platform.
pub trait RouteProbe: Send + Sync {
    /// Returns the IPv4 next hop of the default route, if one can be found.
    fn default_gateway(&self) -> Option<Ipv4Addr>;

    /// Sends one echo request to `host` and returns the TTL of the reply.
    ///
    /// `timeout` bounds the wait for the reply.
    fn ping_ttl(&self, host: &str, timeout: Duration) -> Option<u32>;
}

/// Rejects hosts that the ping utility would read as an option flag.
fn is_safe_ping_target(host: &str) -> bool {
    !host.is_empty() && !host.starts_with('-')
}

/// Whole seconds for utilities that only take second granularity (minimum 1).
#[cfg(unix)]
fn whole_seconds(timeout: Duration) -> u64 {
    let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
    secs.max(1)
}

// ── POSIX implementation ──────────────────────────────────────────────────────

#[cfg(unix)]
pub mod posix;

/// Re-export the POSIX probe as `NativeRouteProbe` on Unix-like systems.
#[cfg(unix)]
pub use posix::PosixRouteProbe as NativeRouteProbe;

// ── Windows implementation ────────────────────────────────────────────────────

#[cfg(windows)]
pub mod windows;

/// Re-export the Windows probe as `NativeRouteProbe` on Windows.
#[cfg(windows)]
pub use windows::WindowsRouteProbe as NativeRouteProbe;

// ── Tests ─────────────────────────────────────────────────────────────────────
