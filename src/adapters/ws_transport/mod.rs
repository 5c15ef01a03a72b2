//! WebSocket transport adapter — implements [`Connector`] and [`Link`].
//!
//! A connection is a plain `ws://` upgrade over a `std::net::TcpStream`,
//! framed by `tungstenite`. The handshake runs blocking with a timeout;
//! afterwards the socket is switched to non-blocking and handed to a
//! dedicated I/O thread (see [`io_task`]) which services pings, inbound
//! frames and the outbound queue.
//!
//! ```text
//!  TelemetryLoop ──try_send──▶ outbound Channel ──▶ ws-io thread ──▶ TcpStream
//!                ◀─is_usable── LinkShared.state ◀── (read / liveness / write)
//! ```
//!
//! State only ever moves forward: `Connecting → Open → Closed | Failed`.
//! The first terminal transition wins and records the cause.

mod io_task;

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};
use tungstenite::client::IntoClientRequest;

use crate::app::ports::{CloseReport, Connector, Link};
use crate::config::TelemetryConfig;
use crate::error::{ConnectError, LinkError};
use crate::session::liveness::LivenessProbe;

/// Largest serialised packet the link accepts.
pub const FRAME_CAPACITY: usize = 1024;

/// Frames queued ahead of the I/O thread. One cycle produces two.
pub const OUTBOUND_DEPTH: usize = 4;

pub(crate) type Frame = heapless::String<FRAME_CAPACITY>;

/// Connection lifecycle as seen by both threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Connecting = 0,
    Open = 1,
    /// Closed by the peer or an orderly shutdown.
    Closed = 2,
    /// Declared dead locally (I/O error, pong timeout, loop failure).
    Failed = 3,
}

impl LinkState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closed,
            _ => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

/// State shared between the owning [`WsLink`] and its I/O thread.
pub(crate) struct LinkShared {
    state: AtomicU8,
    outbound: Channel<CriticalSectionRawMutex, Frame, OUTBOUND_DEPTH>,
    cause: Mutex<Option<String>>,
}

impl LinkShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(LinkState::Connecting as u8),
            outbound: Channel::new(),
            cause: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn open(&self) -> bool {
        self.state
            .compare_exchange(
                LinkState::Connecting as u8,
                LinkState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to a terminal state. Returns `false` if already terminal.
    ///
    /// The cause lock is held across the transition, so anyone who sees a
    /// terminal state and then asks for [`cause`](Self::cause) gets it.
    pub(crate) fn terminate(&self, to: LinkState, cause: &str) -> bool {
        debug_assert!(to.is_terminal());
        let mut recorded = self.cause.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if LinkState::from_u8(current).is_terminal() {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        *recorded = Some(cause.to_owned());
        true
    }

    pub(crate) fn cause(&self) -> Option<String> {
        self.cause.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// ── Link ─────────────────────────────────────────────────────

pub struct WsLink {
    shared: Arc<LinkShared>,
    io: Mutex<Option<JoinHandle<CloseReport>>>,
    report: Mutex<Option<CloseReport>>,
}

impl WsLink {
    pub fn state(&self) -> LinkState {
        self.shared.state()
    }
}

impl Link for WsLink {
    fn is_usable(&self) -> bool {
        self.shared.state() == LinkState::Open
    }

    fn try_send(&self, message: &str) -> Result<bool, LinkError> {
        if !self.is_usable() {
            return Ok(false);
        }
        let mut frame = Frame::new();
        frame.push_str(message).map_err(|_| LinkError::FrameTooLarge)?;
        self.shared
            .outbound
            .try_send(frame)
            .map_err(|_| LinkError::QueueFull)?;
        Ok(true)
    }

    fn fail(&self, cause: &str) {
        if self.shared.terminate(LinkState::Failed, cause) {
            warn!("LINK | connection failed: {}", cause);
        }
    }

    fn wait_closed(&self) -> CloseReport {
        let handle = self.io.lock().unwrap_or_else(PoisonError::into_inner).take();
        let mut cached = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handle {
            let report = handle.join().unwrap_or_else(|_| CloseReport {
                code: None,
                reason: "I/O thread panicked".to_owned(),
            });
            *cached = Some(report);
        }
        cached.clone().unwrap_or_default()
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        self.shared.terminate(LinkState::Failed, "link dropped");
        if let Some(handle) = self.io.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = handle.join();
        }
    }
}

// ── Connector ────────────────────────────────────────────────

/// Timeouts applied to each new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTimeouts {
    pub connect: Duration,
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
}

impl From<&TelemetryConfig> for LinkTimeouts {
    fn from(config: &TelemetryConfig) -> Self {
        Self {
            connect: config.connect_timeout(),
            ping_interval: config.ping_interval(),
            pong_timeout: config.pong_timeout(),
        }
    }
}

pub struct WsConnector {
    endpoint: String,
    timeouts: LinkTimeouts,
}

impl WsConnector {
    pub fn new(endpoint: impl Into<String>, timeouts: LinkTimeouts) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeouts,
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.endpoint.clone(), LinkTimeouts::from(config))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Connector for WsConnector {
    type Link = WsLink;

    fn connect(&mut self) -> Result<WsLink, ConnectError> {
        let request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| ConnectError::InvalidEndpoint(e.to_string()))?;

        let uri = request.uri();
        if uri.scheme_str() != Some("ws") {
            return Err(ConnectError::InvalidEndpoint(format!(
                "{}: only ws:// is supported",
                self.endpoint
            )));
        }
        let host = uri
            .host()
            .ok_or_else(|| ConnectError::InvalidEndpoint(format!("{}: missing host", self.endpoint)))?
            .to_owned();
        let port = uri.port_u16().unwrap_or(80);

        let addr = (host.as_str(), port)
            .to_socket_addrs()
            .map_err(|e| ConnectError::Resolve(format!("{host}: {e}")))?
            .next()
            .ok_or_else(|| ConnectError::Resolve(format!("{host}: no addresses")))?;

        let stream = TcpStream::connect_timeout(&addr, self.timeouts.connect)
            .map_err(|e| ConnectError::Tcp(format!("{addr}: {e}")))?;
        let tcp_err = |e: std::io::Error| ConnectError::Tcp(e.to_string());
        stream.set_read_timeout(Some(self.timeouts.connect)).map_err(tcp_err)?;
        stream.set_write_timeout(Some(self.timeouts.connect)).map_err(tcp_err)?;
        stream.set_nodelay(true).map_err(tcp_err)?;

        let (socket, response) = tungstenite::client(request, stream)
            .map_err(|e| ConnectError::Handshake(e.to_string()))?;
        socket.get_ref().set_nonblocking(true).map_err(tcp_err)?;
        info!("LINK | upgraded {} (HTTP {})", addr, response.status());

        let shared = Arc::new(LinkShared::new());
        shared.open();

        let probe = LivenessProbe::new(
            self.timeouts.ping_interval,
            self.timeouts.pong_timeout,
            Instant::now(),
        );
        let io_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("ws-io".into())
            .spawn(move || io_task::run(socket, &io_shared, probe))
            .map_err(|e| {
                shared.terminate(LinkState::Failed, "I/O thread spawn failed");
                ConnectError::Tcp(format!("spawn I/O thread: {e}"))
            })?;

        Ok(WsLink {
            shared,
            io: Mutex::new(Some(handle)),
            report: Mutex::new(None),
        })
    }
}
