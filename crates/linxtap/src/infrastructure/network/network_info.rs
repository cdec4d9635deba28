//! Local and remote host inspection.
//!
//! [`NetworkInfo`] answers the questions the shell shows next to a connection:
//! this machine's hostname and outbound IP, the default gateway, the remote
//! host's TTL, and whether the remote host *is* the gateway.
//!
//! # Contract
//!
//! None of these functions fail.  Every lookup is best-effort and degrades to
//! `"Unknown"`, `None`, or `false`, with the swallowed cause logged at `debug`
//! level.  Callers rely on this to enrich a connection without risking it.
//!
//! # How the local IP is found
//!
//! A UDP socket is "connected" to a public address.  No packet is sent; the
//! OS merely picks the outbound interface, whose address is then read back
//! from `local_addr()`.  If that fails (no route), the hostname is resolved
//! and the first non-loopback IPv4 address is used.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

pub use linxtap_core::{classify_os, RemoteOs};
use tracing::debug;

use super::route_probe::{command::DEFAULT_COMMAND_TIMEOUT, NativeRouteProbe, RouteProbe};

/// Placeholder returned when a local lookup fails.
pub const UNKNOWN: &str = "Unknown";

/// Public address used only to select the outbound interface.
pub const DEFAULT_LOCAL_IP_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Host inspection utilities backed by a platform [`RouteProbe`].
pub struct NetworkInfo {
    probe: Box<dyn RouteProbe>,
    local_ip_target: SocketAddr,
}

impl NetworkInfo {
    /// Creates an inspector using `probe` for gateway and ping lookups.
    pub fn new(probe: Box<dyn RouteProbe>) -> Self {
        Self {
            probe,
            local_ip_target: DEFAULT_LOCAL_IP_TARGET,
        }
    }

    /// Creates an inspector using the compile-time selected platform probe.
    pub fn native(command_timeout: Duration) -> Self {
        Self::new(Box::new(NativeRouteProbe::new(command_timeout)))
    }

    /// Overrides the address used to pick the outbound interface.
    pub fn with_local_ip_target(mut self, target: SocketAddr) -> Self {
        self.local_ip_target = target;
        self
    }

    /// Returns this machine's outbound IPv4 address, or `"Unknown"`.
    pub fn get_local_ip(&self) -> String {
        local_ip_via_udp(self.local_ip_target)
            .or_else(local_ip_from_hostname)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Returns the OS-reported hostname, or `"Unknown"`.
    pub fn get_hostname(&self) -> String {
        hostname_or_unknown()
    }

    /// Returns the default gateway, if any discovery method finds one.
    pub fn get_default_gateway(&self) -> Option<Ipv4Addr> {
        self.probe.default_gateway()
    }

    /// Returns the TTL observed for `host:port`, or `None`.
    ///
    /// Opens a short-lived TCP connection bounded by `timeout` and reads the
    /// IP-level TTL socket option.  If the option cannot be read, falls back
    /// to one ping through the route probe.  A failed connection yields
    /// `None` without pinging.
    pub fn get_remote_ttl(&self, host: &str, port: u16, timeout: Duration) -> Option<u32> {
        let addr = match (host, port).to_socket_addrs() {
            Ok(mut addrs) => addrs.next()?,
            Err(e) => {
                debug!("ttl probe: cannot resolve {host}: {e}");
                return None;
            }
        };

        let stream = match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => stream,
            Err(e) => {
                debug!("ttl probe: connect to {addr} failed: {e}");
                return None;
            }
        };

        let ttl = match stream.ttl() {
            Ok(ttl) => Some(ttl),
            Err(e) => {
                debug!("ttl probe: IP_TTL unavailable on {addr}: {e}; falling back to ping");
                self.probe.ping_ttl(host, timeout)
            }
        };
        let _ = stream.shutdown(std::net::Shutdown::Both);
        ttl
    }

    /// Whether `host` is this machine's default gateway.
    ///
    /// `false` when the gateway cannot be determined.
    pub fn is_gateway(&self, host: &str) -> bool {
        self.get_default_gateway()
            .is_some_and(|gw| gw.to_string() == host.trim())
    }

    /// Classifies a TTL; see [`linxtap_core::classify_os`].
    pub fn classify_os(ttl: u32) -> RemoteOs {
        classify_os(ttl)
    }
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self::native(DEFAULT_COMMAND_TIMEOUT)
    }
}

fn local_ip_via_udp(target: SocketAddr) -> Option<IpAddr> {
    let bind_addr: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let result = UdpSocket::bind(bind_addr)
        .and_then(|socket| socket.connect(target).map(|()| socket))
        .and_then(|socket| socket.local_addr());

    match result {
        Ok(local) if !local.ip().is_unspecified() => Some(local.ip()),
        Ok(_) => None,
        Err(e) => {
            debug!("local ip via {target} failed: {e}");
            None
        }
    }
}

fn local_ip_from_hostname() -> Option<IpAddr> {
    let name = hostname::get().ok()?.into_string().ok()?;
    match (name.as_str(), 0).to_socket_addrs() {
        Ok(addrs) => addrs
            .map(|a| a.ip())
            .find(|ip| ip.is_ipv4() && !ip.is_loopback()),
        Err(e) => {
            debug!("cannot resolve own hostname {name}: {e}");
            None
        }
    }
}

fn hostname_or_unknown() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
