//! POSIX default-route parsers.

use std::net::Ipv4Addr;

/// Extracts the next hop of the IPv4 default route from
/// `ip route show default` output.
///
/// ```text
/// default via 192.168.1.1 dev wlan0 proto dhcp metric 600
/// ```
pub fn parse_ip_route_default(output: &str) -> Option<Ipv4Addr> {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with("default"))
        .find_map(|line| {
            let mut tokens = line.split_whitespace();
            tokens.find(|t| *t == "via")?;
            tokens.next()?.parse::<Ipv4Addr>().ok()
        })
}

/// Extracts the gateway from BSD / macOS `route -n get default` output.
///
/// ```text
///    route to: default
/// destination: default
///     gateway: 10.0.0.1
///   interface: en0
/// ```
pub fn parse_bsd_route_get(output: &str) -> Option<Ipv4Addr> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "gateway" {
            return None;
        }
        value.trim().parse::<Ipv4Addr>().ok()
    })
}

/// Extracts the default gateway from the Linux `/proc/net/route` table.
///
/// Columns are whitespace separated; `Destination` and `Gateway` are 32-bit
/// hex values in host (little-endian) byte order, so `0101A8C0` is
/// `192.168.1.1`.  The default route is the row whose destination is
/// `00000000`.
pub fn parse_proc_net_route(table: &str) -> Option<Ipv4Addr> {
    table.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 || fields[1] != "00000000" {
            return None;
        }
        let gateway = decode_hex_ipv4(fields[2])?;
        (!gateway.is_unspecified()).then_some(gateway)
    })
}

/// Decodes a byte-reversed hex IPv4 address as found in `/proc/net/*`.
fn decode_hex_ipv4(hex: &str) -> Option<Ipv4Addr> {
    let raw = u32::from_str_radix(hex, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_route_default_reads_via_address() {
        let out = "default via 192.168.1.1 dev wlan0 proto dhcp metric 600\n\
                   10.8.0.0/24 dev tun0 proto kernel scope link src 10.8.0.2\n";
        assert_eq!(
            parse_ip_route_default(out),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_parse_ip_route_default_without_via_returns_none() {
        // Point-to-point default route has no next hop.
        assert_eq!(parse_ip_route_default("default dev ppp0 scope link\n"), None);
        assert_eq!(parse_ip_route_default(""), None);
    }

    #[test]
    fn test_parse_bsd_route_get_reads_gateway_line() {
        let out = "   route to: default\ndestination: default\n       mask: default\n    gateway: 10.0.0.1\n  interface: en0\n";
        assert_eq!(parse_bsd_route_get(out), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_parse_proc_net_route_decodes_byte_reversed_gateway() {
        let table = "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n\
                     eth0\t0000A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0\n\
                     eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n";
        assert_eq!(
            parse_proc_net_route(table),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_parse_proc_net_route_without_default_row_returns_none() {
        let table = "Iface\tDestination\tGateway \tFlags\n\
                     eth0\t0000A8C0\t00000000\t0001\n";
        assert_eq!(parse_proc_net_route(table), None);
    }

    #[test]
    fn test_decode_hex_ipv4_rejects_garbage() {
        assert_eq!(decode_hex_ipv4("XYZ"), None);
        assert_eq!(decode_hex_ipv4("0100000A"), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }
}
