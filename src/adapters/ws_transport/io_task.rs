//! Per-connection I/O thread — liveness, inbound frames, outbound queue.
//!
//! Runs `edge-executor` with three cooperative futures sharing one
//! non-blocking `WebSocket<TcpStream>`:
//!
//! 1. **Liveness** — every 250ms: send a ping when due, fail the link when
//!    the pong deadline passes.
//! 2. **Read** — polls the socket every 20ms; records pongs and close frames.
//! 3. **Write** — wakes on the outbound channel, frames and flushes.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────┐
//!  │  ws-io thread                                        │
//!  │  futures_lite::block_on(executor.run(race))          │
//!  │  ┌──────────┐   ┌──────────┐   ┌─────────────────┐   │
//!  │  │ Liveness │ or│   Read   │ or│  Write (async)  │   │
//!  │  │  250ms ⏱ │   │  20ms ⏱  │   │  wake-on-send   │   │
//!  │  └──────────┘   └──────────┘   └─────────────────┘   │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! The first future to observe a terminal link state returns, which ends
//! the race and drops the other two.

use core::cell::RefCell;
use core::time::Duration;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::rc::Rc;
use std::time::Instant;

// Links the std time driver the async-io-mini timers tick on.
use embassy_time as _;
use futures_lite::FutureExt;
use log::{debug, info, warn};
use tungstenite::protocol::WebSocket;
use tungstenite::{Error as WsError, Message};

use super::{LinkShared, LinkState};
use crate::app::ports::CloseReport;
use crate::session::liveness::LivenessProbe;

const LIVENESS_TICK: Duration = Duration::from_millis(250);
const READ_POLL: Duration = Duration::from_millis(20);

type SharedSocket = Rc<RefCell<WebSocket<TcpStream>>>;
type SharedProbe = Rc<RefCell<LivenessProbe>>;
type PeerClose = Rc<RefCell<Option<CloseReport>>>;

fn would_block(e: &WsError) -> bool {
    matches!(e, WsError::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

async fn liveness_loop(socket: SharedSocket, probe: SharedProbe, shared: &LinkShared) {
    loop {
        if shared.state().is_terminal() {
            return;
        }
        let now = Instant::now();
        let mut p = probe.borrow_mut();
        if p.is_expired(now) {
            if shared.terminate(LinkState::Failed, "pong timeout") {
                warn!("LINK | no pong within deadline, failing connection");
            }
            return;
        }
        if p.ping_due(now) {
            match socket.borrow_mut().send(Message::Ping(Default::default())) {
                Ok(()) => p.on_ping_sent(now),
                Err(e) if would_block(&e) => p.on_ping_sent(now),
                Err(e) => {
                    shared.terminate(LinkState::Failed, &format!("ping failed: {e}"));
                    return;
                }
            }
            debug!("LINK | ping");
        }
        drop(p);
        async_io_mini::Timer::after(LIVENESS_TICK).await;
    }
}

async fn read_loop(socket: SharedSocket, probe: SharedProbe, peer: PeerClose, shared: &LinkShared) {
    loop {
        {
            let mut ws = socket.borrow_mut();
            loop {
                match ws.read() {
                    Ok(Message::Pong(_)) => probe.borrow_mut().on_pong(Instant::now()),
                    Ok(Message::Close(frame)) => {
                        let report = frame.map_or_else(
                            || CloseReport {
                                code: None,
                                reason: "closed by peer".to_owned(),
                            },
                            |f| CloseReport {
                                code: Some(u16::from(f.code)),
                                reason: f.reason.as_str().to_owned(),
                            },
                        );
                        shared.terminate(LinkState::Closed, &report.reason);
                        *peer.borrow_mut() = Some(report);
                        // Push out the close reply tungstenite queued.
                        let _ = ws.flush();
                        return;
                    }
                    Ok(other) => debug!("LINK | ignoring inbound {} byte frame", other.len()),
                    Err(e) if would_block(&e) => break,
                    Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                        shared.terminate(LinkState::Closed, "connection closed");
                        return;
                    }
                    Err(e) => {
                        shared.terminate(LinkState::Failed, &format!("read failed: {e}"));
                        return;
                    }
                }
            }
            // Drain anything a previous send left buffered.
            match ws.flush() {
                Ok(()) => {}
                Err(e) if would_block(&e) => {}
                Err(e) => {
                    shared.terminate(LinkState::Failed, &format!("flush failed: {e}"));
                    return;
                }
            }
        }
        if shared.state().is_terminal() {
            return;
        }
        async_io_mini::Timer::after(READ_POLL).await;
    }
}

async fn write_loop(socket: SharedSocket, shared: &LinkShared) {
    loop {
        let frame = shared.outbound.receive().await;
        if shared.state().is_terminal() {
            return;
        }
        match socket.borrow_mut().send(Message::text(frame.as_str().to_owned())) {
            Ok(()) => {}
            // Frame is buffered; the read loop keeps flushing.
            Err(e) if would_block(&e) => {}
            Err(e) => {
                shared.terminate(LinkState::Failed, &format!("send failed: {e}"));
                return;
            }
        }
    }
}

/// Thread entry point. Returns once the link reaches a terminal state.
pub(super) fn run(socket: WebSocket<TcpStream>, shared: &LinkShared, probe: LivenessProbe) -> CloseReport {
    let socket: SharedSocket = Rc::new(RefCell::new(socket));
    let probe: SharedProbe = Rc::new(RefCell::new(probe));
    let peer: PeerClose = Rc::new(RefCell::new(None));

    {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        let liveness = executor.spawn(liveness_loop(socket.clone(), probe.clone(), shared));
        let read = executor.spawn(read_loop(socket.clone(), probe, peer.clone(), shared));
        let write = executor.spawn(write_loop(socket.clone(), shared));

        debug!("LINK | I/O task started");
        futures_lite::future::block_on(executor.run(liveness.or(read).or(write)));
    }

    let state = shared.state();
    if state == LinkState::Failed {
        // Best-effort goodbye; the peer may already be gone.
        let mut ws = socket.borrow_mut();
        let _ = ws.close(None);
        let _ = ws.flush();
    }

    let report = peer.borrow_mut().take().unwrap_or_else(|| CloseReport {
        code: None,
        reason: shared.cause().unwrap_or_else(|| "connection ended".to_owned()),
    });
    info!("LINK | I/O task finished ({:?})", state);
    report
}
