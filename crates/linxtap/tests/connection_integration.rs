//! Integration tests for the connection manager against live local sockets.
//!
//! # Purpose
//!
//! These tests drive `ConnectionManager` and `ProbeSession` through their
//! public API the way the shell does, against listeners bound to ephemeral
//! ports on `127.0.0.1`.  They verify:
//!
//! - The happy path: connect, send `"ping"` to an echo peer, read `"ping"`.
//! - The toggle: `connect` while connected disconnects and ignores the new
//!   target.
//! - Failures leave the manager disconnected: refused port, bad input.
//! - A peer that closes the socket forces the manager back to disconnected
//!   on a later send.
//!
//! Every test gets its own listener, so they run in parallel safely.
//!
//! # Why the echo server accepts in a loop
//!
//! Connecting opens a second, short-lived connection to observe the remote
//! TTL.  The echo server must therefore keep accepting after the first
//! client.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use linxtap::application::probe_session::{ProbeSession, CONNECTION_LOST};
use linxtap::infrastructure::network::connection_manager::{ConnectionManager, NetworkConfig};
use linxtap::infrastructure::network::network_info::NetworkInfo;
use linxtap::infrastructure::network::route_probe::StaticRouteProbe;
use linxtap_core::{ConnectError, ConnectOutcome, InputError, RemoteOs, SendError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn manager_with_gateway(gateway: Option<Ipv4Addr>) -> ConnectionManager {
    let info = NetworkInfo::new(Box::new(StaticRouteProbe::new(gateway, None)));
    ConnectionManager::new(NetworkConfig::default(), Arc::new(info))
}

fn manager() -> ConnectionManager {
    manager_with_gateway(None)
}

/// Binds an echo server on an ephemeral port and returns the port.
fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind echo listener");
    let port = listener.local_addr().expect("local addr").port();
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            thread::spawn(move || {
                let mut buf = [0u8; 4096];
                while let Ok(n) = stream.read(&mut buf) {
                    if n == 0 || stream.write_all(&buf[..n]).is_err() {
                        break;
                    }
                }
            });
        }
    });
    port
}

/// Binds a server that closes every accepted connection immediately.
fn spawn_closing_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind closing listener");
    let port = listener.local_addr().expect("local addr").port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            drop(stream);
        }
    });
    port
}

/// Returns a port with no listener behind it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}

// ── Connect ───────────────────────────────────────────────────────────────────

#[test]
fn test_connect_echo_and_send_ping_returns_ping() {
    // Arrange
    let port = spawn_echo_server();
    let mut mgr = manager();

    // Act
    let outcome = mgr.connect("127.0.0.1", &port.to_string()).expect("connect");
    let report = mgr.send_message("ping").expect("send");

    // Assert
    assert!(matches!(outcome, ConnectOutcome::Connected(_)));
    assert_eq!(report.bytes_sent, 4);
    assert_eq!(report.response.as_deref(), Some("ping"));
    assert_eq!(report.message(), "Sent 4 bytes");
}

#[test]
fn test_connect_reports_os_from_loopback_ttl() {
    let port = spawn_echo_server();
    let mut mgr = manager();

    let outcome = mgr.connect("127.0.0.1", &port.to_string()).expect("connect");

    let ConnectOutcome::Connected(report) = outcome else {
        panic!("expected Connected");
    };
    // Loopback TTL is 64 on Linux/macOS and 128 on Windows.
    assert!(
        matches!(report.remote_os, RemoteOs::LinuxUnix | RemoteOs::Windows),
        "unexpected guess {:?} for ttl {:?}",
        report.remote_os,
        report.ttl
    );
    assert!(!report.is_gateway);
}

#[test]
fn test_connect_flags_gateway_when_host_matches() {
    let port = spawn_echo_server();
    let mut mgr = manager_with_gateway(Some(Ipv4Addr::LOCALHOST));

    mgr.connect("127.0.0.1", &port.to_string()).expect("connect");

    assert!(mgr.is_gateway_device());
}

#[test]
fn test_connect_twice_toggles_to_disconnected() {
    // Arrange
    let port = spawn_echo_server();
    let mut mgr = manager();
    mgr.connect("127.0.0.1", &port.to_string()).expect("first connect");

    // Act: the second target is never contacted.
    let second = mgr.connect("192.0.2.1", "1").expect("toggle");

    // Assert
    assert!(matches!(second, ConnectOutcome::Disconnected { .. }));
    assert!(second.message().contains(&format!("127.0.0.1:{port}")));
    assert!(!mgr.is_connected());
    assert_eq!(mgr.send_message("ping"), Err(SendError::NotConnected));
}

#[test]
fn test_connect_reconnect_after_toggle() {
    let port = spawn_echo_server();
    let mut mgr = manager();
    let port_text = port.to_string();

    mgr.connect("127.0.0.1", &port_text).expect("connect");
    mgr.connect("127.0.0.1", &port_text).expect("toggle off");
    let third = mgr.connect("127.0.0.1", &port_text).expect("reconnect");

    assert!(matches!(third, ConnectOutcome::Connected(_)));
    assert_eq!(
        mgr.send_message("again").expect("send").response.as_deref(),
        Some("again")
    );
}

#[test]
fn test_connect_to_closed_port_fails_and_stays_disconnected() {
    let port = closed_port();
    let mut mgr = manager();

    let result = mgr.connect("127.0.0.1", &port.to_string());

    assert!(
        matches!(
            result,
            Err(ConnectError::Refused { .. }) | Err(ConnectError::Timeout { .. })
        ),
        "got {result:?}"
    );
    assert!(!mgr.is_connected());
    assert!(mgr.remote_endpoint().is_none());
}

#[test]
fn test_connect_invalid_input_messages() {
    let mut mgr = manager();

    let cases = [
        ("", "80", InputError::MissingField),
        ("127.0.0.1", "abc", InputError::PortNotNumeric),
        ("127.0.0.1", "0", InputError::PortOutOfRange),
        ("127.0.0.1", "70000", InputError::PortOutOfRange),
    ];

    for (host, port, expected) in cases {
        assert_eq!(
            mgr.connect(host, port),
            Err(ConnectError::InvalidInput(expected)),
            "input ({host:?}, {port:?})"
        );
        assert!(!mgr.is_connected());
    }
}

// ── Send ──────────────────────────────────────────────────────────────────────

#[test]
fn test_send_before_connect_is_not_connected() {
    let mut mgr = manager();
    assert_eq!(mgr.send_message("hi"), Err(SendError::NotConnected));
    assert_eq!(
        SendError::NotConnected.to_string(),
        "not connected to any device"
    );
}

#[test]
fn test_send_after_peer_close_eventually_forces_disconnect() {
    // Arrange
    let port = spawn_closing_server();
    let mut mgr = manager();
    mgr.connect("127.0.0.1", &port.to_string()).expect("connect");
    thread::sleep(Duration::from_millis(100));

    // Act: the first write may still succeed; the reset surfaces on a
    // following read or write.
    let mut last = None;
    for _ in 0..10 {
        match mgr.send_message("ping") {
            Ok(_) => thread::sleep(Duration::from_millis(50)),
            Err(e) => {
                last = Some(e);
                break;
            }
        }
    }

    // Assert
    let err = last.expect("a send must eventually fail after the peer closed");
    assert!(err.drops_connection(), "unexpected error {err:?}");
    assert!(!mgr.is_connected());
}

// ── Session ───────────────────────────────────────────────────────────────────

#[test]
fn test_session_logs_full_exchange() {
    // Arrange
    let port = spawn_echo_server();
    let mut session = ProbeSession::new(manager());

    // Act
    session
        .connect("127.0.0.1", &port.to_string())
        .expect("connect");
    session.send("ping").expect("send");
    session.disconnect();

    // Assert
    let texts: Vec<&str> = session
        .log()
        .entries()
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            format!("Connected to 127.0.0.1:{port}").as_str(),
            "SENT: ping",
            "✓ Sent 4 bytes",
            "RESPONSE: ping",
            "Disconnected",
        ]
    );
}

#[test]
fn test_session_logs_connection_lost_after_peer_close() {
    let port = spawn_closing_server();
    let mut session = ProbeSession::new(manager());
    session
        .connect("127.0.0.1", &port.to_string())
        .expect("connect");
    thread::sleep(Duration::from_millis(100));

    for _ in 0..10 {
        if session.send("ping").is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    assert!(!session.is_connected());
    let last = session.log().entries().last().expect("log entry");
    assert_eq!(last.text, CONNECTION_LOST);
}
