//! Fixed-answer route probe for tests.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::RouteProbe;

/// A [`RouteProbe`] that returns values chosen at construction time and makes
/// no OS calls.
///
/// Call counters let tests assert that a lookup was (or was not) attempted.
#[derive(Debug, Default)]
pub struct StaticRouteProbe {
    pub gateway: Option<Ipv4Addr>,
    pub ttl: Option<u32>,
    gateway_calls: AtomicUsize,
    ping_calls: AtomicUsize,
}

impl StaticRouteProbe {
    pub fn new(gateway: Option<Ipv4Addr>, ttl: Option<u32>) -> Self {
        Self {
            gateway,
            ttl,
            ..Default::default()
        }
    }

    /// A probe that finds neither a gateway nor a TTL.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn gateway_calls(&self) -> usize {
        self.gateway_calls.load(Ordering::Relaxed)
    }

    pub fn ping_calls(&self) -> usize {
        self.ping_calls.load(Ordering::Relaxed)
    }
}

impl RouteProbe for StaticRouteProbe {
    fn default_gateway(&self) -> Option<Ipv4Addr> {
        self.gateway_calls.fetch_add(1, Ordering::Relaxed);
        self.gateway
    }

    fn ping_ttl(&self, _host: &str, _timeout: Duration) -> Option<u32> {
        self.ping_calls.fetch_add(1, Ordering::Relaxed);
        self.ttl
    }
}
