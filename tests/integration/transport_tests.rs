//! WebSocket transport tests against a loopback `tungstenite` peer.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use seatlink::adapters::ws_transport::{LinkState, LinkTimeouts, WsConnector};
use seatlink::app::ports::{Connector, Link};

fn timeouts(ping_ms: u64, pong_ms: u64) -> LinkTimeouts {
    LinkTimeouts {
        connect: Duration::from_secs(2),
        ping_interval: Duration::from_millis(ping_ms),
        pong_timeout: Duration::from_millis(pong_ms),
    }
}

/// Accepts one client and holds the socket open for `hold` without reading.
fn silent_peer(hold: Duration) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let _ws = tungstenite::accept(stream).unwrap();
        thread::sleep(hold);
    });
    (port, handle)
}

#[test]
fn repeated_usability_checks_leave_state_unchanged() {
    let (port, peer) = silent_peer(Duration::from_millis(300));
    let mut connector = WsConnector::new(format!("ws://127.0.0.1:{port}"), timeouts(30_000, 10_000));
    let link = connector.connect().unwrap();

    for _ in 0..1000 {
        assert!(link.is_usable());
    }
    assert_eq!(link.state(), LinkState::Open);

    link.fail("done");
    link.wait_closed();
    peer.join().unwrap();
}

#[test]
fn unanswered_ping_fails_the_link() {
    // The peer never reads, so pings are never answered.
    let (port, peer) = silent_peer(Duration::from_secs(3));
    let mut connector = WsConnector::new(format!("ws://127.0.0.1:{port}"), timeouts(100, 50));
    let link = connector.connect().unwrap();

    let report = link.wait_closed();
    assert_eq!(report.reason, "pong timeout");
    assert_eq!(report.code, None);
    assert_eq!(link.state(), LinkState::Failed);
    assert!(!link.is_usable());
    assert_eq!(link.try_send("{}"), Ok(false));
    peer.join().unwrap();
}

#[test]
fn answered_pings_keep_the_link_open() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut ws = tungstenite::accept(stream).unwrap();
        // Reading answers pings automatically; stop when the client leaves.
        while ws.read().is_ok() {}
    });

    let mut connector = WsConnector::new(format!("ws://127.0.0.1:{port}"), timeouts(100, 80));
    let link = connector.connect().unwrap();
    thread::sleep(Duration::from_millis(1200));
    assert!(link.is_usable(), "link failed despite pongs");

    link.fail("test finished");
    assert_eq!(link.wait_closed().reason, "test finished");
    peer.join().unwrap();
}
