//! TTL extraction from `ping` output.
//!
//! Formats seen in the wild:
//!
//! ```text
//! 64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.412 ms        (Linux, macOS)
//! Reply from 10.0.0.1: bytes=32 time<1ms TTL=128                   (Windows)
//! 64 bytes from 10.0.0.1: icmp_seq=0 ttl 255 time=1.2 ms           (some BSDs)
//! ```

use std::sync::OnceLock;

use regex::Regex;

fn ttl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Literal pattern; covered by the tests below.
        Regex::new(r"(?i)\bttl[=:\s]\s*(\d{1,5})\b").expect("literal TTL pattern compiles")
    })
}

/// Returns the first TTL value in `output`, or `None` if no reply line
/// carries one.
pub fn parse_ping_ttl(output: &str) -> Option<u32> {
    ttl_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
