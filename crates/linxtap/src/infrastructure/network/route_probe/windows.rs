//! Windows route probe.
//!
//! Gateway discovery reads `ipconfig` first and falls back to the
//! `route print 0.0.0.0` table when no adapter reports an IPv4 gateway.

use std::net::Ipv4Addr;
use std::time::Duration;

use linxtap_core::routing::{parse_ipconfig_gateway, parse_ping_ttl, parse_route_print_gateway};
use tracing::debug;

use super::command::run_with_timeout;
use super::{is_safe_ping_target, RouteProbe};

/// Windows implementation of [`RouteProbe`].
pub struct WindowsRouteProbe {
    command_timeout: Duration,
}

impl WindowsRouteProbe {
    /// Creates a probe whose utility invocations are bounded by `command_timeout`.
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }
}

impl Default for WindowsRouteProbe {
    fn default() -> Self {
        Self::new(super::command::DEFAULT_COMMAND_TIMEOUT)
    }
}

impl RouteProbe for WindowsRouteProbe {
    fn default_gateway(&self) -> Option<Ipv4Addr> {
        let from_ipconfig = run_with_timeout("ipconfig", &[], self.command_timeout)
            .and_then(|out| parse_ipconfig_gateway(&out));

        let gateway = from_ipconfig.or_else(|| {
            run_with_timeout("route", &["print", "0.0.0.0"], self.command_timeout)
                .and_then(|out| parse_route_print_gateway(&out))
        });
        debug!("default gateway: {gateway:?}");
        gateway
    }

    fn ping_ttl(&self, host: &str, timeout: Duration) -> Option<u32> {
        if !is_safe_ping_target(host) {
            return None;
        }
        // -w takes milliseconds.
        let wait_ms = timeout.as_millis().max(1).to_string();
        let out = run_with_timeout(
            "ping",
            &["-n", "1", "-w", wait_ms.as_str(), host],
            timeout + Duration::from_secs(1),
        )?;
        let ttl = parse_ping_ttl(&out);
        debug!("ping {host}: ttl={ttl:?}");
        ttl
    }
}
