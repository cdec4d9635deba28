//! POSIX route probe.
//!
//! Gateway discovery tries, in order:
//!
//! 1. `ip route show default` (iproute2, Linux)
//! 2. `route -n get default` (macOS and the BSDs)
//! 3. `/proc/net/route` (Linux kernel table; works without any utility installed)
//!
//! The first source that yields an address wins.

use std::net::Ipv4Addr;
use std::time::Duration;

use linxtap_core::routing::{
    parse_bsd_route_get, parse_ip_route_default, parse_ping_ttl, parse_proc_net_route,
};
use tracing::debug;

use super::command::run_with_timeout;
use super::{is_safe_ping_target, whole_seconds, RouteProbe};

const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Unix implementation of [`RouteProbe`].
pub struct PosixRouteProbe {
    command_timeout: Duration,
}

impl PosixRouteProbe {
    /// Creates a probe whose utility invocations are bounded by `command_timeout`.
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    fn gateway_from_ip_route(&self) -> Option<Ipv4Addr> {
        let out = run_with_timeout("ip", &["route", "show", "default"], self.command_timeout)?;
        parse_ip_route_default(&out)
    }

    fn gateway_from_route_get(&self) -> Option<Ipv4Addr> {
        let out = run_with_timeout("route", &["-n", "get", "default"], self.command_timeout)?;
        parse_bsd_route_get(&out)
    }

    fn gateway_from_proc(&self) -> Option<Ipv4Addr> {
        match std::fs::read_to_string(PROC_NET_ROUTE) {
            Ok(table) => parse_proc_net_route(&table),
            Err(e) => {
                debug!("cannot read {PROC_NET_ROUTE}: {e}");
                None
            }
        }
    }
}

impl Default for PosixRouteProbe {
    fn default() -> Self {
        Self::new(super::command::DEFAULT_COMMAND_TIMEOUT)
    }
}

impl RouteProbe for PosixRouteProbe {
    fn default_gateway(&self) -> Option<Ipv4Addr> {
        let gateway = self
            .gateway_from_ip_route()
            .or_else(|| self.gateway_from_route_get())
            .or_else(|| self.gateway_from_proc());
        debug!("default gateway: {gateway:?}");
        gateway
    }

    fn ping_ttl(&self, host: &str, timeout: Duration) -> Option<u32> {
        if !is_safe_ping_target(host) {
            return None;
        }
        let secs = whole_seconds(timeout).to_string();

        // Linux iputils: -W is the reply wait in seconds.
        // macOS/BSD: -W is milliseconds, -t is the overall timeout in seconds.
        #[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd"))]
        let args = ["-c", "1", "-t", secs.as_str(), host];
        #[cfg(not(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd")))]
        let args = ["-c", "1", "-W", secs.as_str(), host];

        // Allow the utility a second beyond its own wait to print and exit.
        let out = run_with_timeout("ping", &args, timeout + Duration::from_secs(1))?;
        let ttl = parse_ping_ttl(&out);
        debug!("ping {host}: ttl={ttl:?}");
        ttl
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_probe_gateway_is_none_or_unicast() {
        let probe = PosixRouteProbe::default();
        if let Some(gw) = probe.default_gateway() {
            assert!(!gw.is_unspecified());
            assert!(!gw.is_broadcast());
        }
    }

    #[test]
    fn test_posix_probe_refuses_option_like_host() {
        let probe = PosixRouteProbe::default();
        assert_eq!(probe.ping_ttl("-c", Duration::from_secs(1)), None);
    }
}
