//! Parsers for routing-table and ping text.
//!
//! The gateway and TTL probes in `linxtap` shell out to OS utilities or read
//! kernel tables.  Their raw output is handed to the functions in this module,
//! which return structured values (`Ipv4Addr`, TTL as `u32`) or `None`.  Keeping
//! the parsers here means every format can be tested on every platform from
//! captured output, without running the utilities.
//!
//! # Sub-modules
//!
//! - **`posix`** – `ip route show default`, BSD `route -n get default`, and the
//!   Linux `/proc/net/route` table.
//! - **`windows`** – `ipconfig` and `route print` output.
//! - **`ping`** – TTL extraction from any platform's `ping` output.

pub mod ping;
pub mod posix;
pub mod windows;

pub use ping::parse_ping_ttl;
pub use posix::{parse_bsd_route_get, parse_ip_route_default, parse_proc_net_route};
pub use windows::{parse_ipconfig_gateway, parse_route_print_gateway};
