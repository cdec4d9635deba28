//! Windows default-gateway parsers.

use std::net::{IpAddr, Ipv4Addr};

/// Extracts the first non-zero IPv4 "Default Gateway" from `ipconfig` output.
///
/// When an adapter has both an IPv6 and an IPv4 gateway, `ipconfig` prints
/// the second address on an indented continuation line with no label:
///
/// ```text
///    Default Gateway . . . . . . . . . : fe80::1%12
///                                        192.168.1.1
/// ```
pub fn parse_ipconfig_gateway(output: &str) -> Option<Ipv4Addr> {
    let mut in_gateway_block = false;

    for line in output.lines() {
        if line.contains("Default Gateway") {
            in_gateway_block = true;
            if let Some(gw) = line.split_once(':').and_then(|(_, v)| usable_ipv4(v)) {
                return Some(gw);
            }
            continue;
        }

        if !in_gateway_block {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.parse::<IpAddr>().is_err() {
            in_gateway_block = false;
            continue;
        }
        if let Some(gw) = usable_ipv4(trimmed) {
            return Some(gw);
        }
    }

    None
}

/// Extracts the gateway of the `0.0.0.0/0.0.0.0` row from `route print`.
///
/// ```text
/// Network Destination        Netmask          Gateway       Interface  Metric
///           0.0.0.0          0.0.0.0      192.168.1.1    192.168.1.50     25
/// ```
pub fn parse_route_print_gateway(output: &str) -> Option<Ipv4Addr> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "0.0.0.0" || tokens.next()? != "0.0.0.0" {
            return None;
        }
        usable_ipv4(tokens.next()?)
    })
}

fn usable_ipv4(text: &str) -> Option<Ipv4Addr> {
    text.trim()
        .parse::<Ipv4Addr>()
        .ok()
        .filter(|ip| !ip.is_unspecified())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipconfig_gateway_same_line() {
        let out = "Ethernet adapter Ethernet:\r\n\r\n   IPv4 Address. . . . . . . . . . . : 192.168.1.50\r\n   Subnet Mask . . . . . . . . . . . : 255.255.255.0\r\n   Default Gateway . . . . . . . . . : 192.168.1.1\r\n";
        assert_eq!(
            parse_ipconfig_gateway(out),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_parse_ipconfig_gateway_continuation_line_after_ipv6() {
        let out = "   Default Gateway . . . . . . . . . : fe80::1%12\r\n                                       10.0.0.1\r\n   DHCP Server . . . . . . . . . . . : 10.0.0.1\r\n";
        assert_eq!(parse_ipconfig_gateway(out), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_parse_ipconfig_gateway_skips_empty_and_zero_gateways() {
        let out = "Wireless LAN adapter Wi-Fi:\r\n   Default Gateway . . . . . . . . . : \r\n\r\nEthernet adapter vEthernet:\r\n   Default Gateway . . . . . . . . . : 0.0.0.0\r\n\r\nEthernet adapter Ethernet:\r\n   Default Gateway . . . . . . . . . : 172.16.0.254\r\n";
        assert_eq!(
            parse_ipconfig_gateway(out),
            Some(Ipv4Addr::new(172, 16, 0, 254))
        );
    }

    #[test]
    fn test_parse_ipconfig_gateway_block_ends_at_next_label() {
        // The DHCP server address must not be mistaken for a gateway.
        let out = "   Default Gateway . . . . . . . . . : \r\n   DHCP Server . . . . . . . . . . . : 10.0.0.1\r\n";
        assert_eq!(parse_ipconfig_gateway(out), None);
    }

    #[test]
    fn test_parse_route_print_gateway_reads_default_row() {
        let out = "IPv4 Route Table\r\n===========================================================================\r\nActive Routes:\r\nNetwork Destination        Netmask          Gateway       Interface  Metric\r\n          0.0.0.0          0.0.0.0      192.168.1.1    192.168.1.50     25\r\n        127.0.0.0        255.0.0.0         On-link         127.0.0.1    331\r\n";
        assert_eq!(
            parse_route_print_gateway(out),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_parse_route_print_gateway_on_link_default_returns_none() {
        let out = "          0.0.0.0          0.0.0.0         On-link      10.8.0.2     35\r\n";
        assert_eq!(parse_route_print_gateway(out), None);
    }
}
