//! Session driver — connect, stream, wait, reconnect. Forever.
//!
//! ```text
//!   ┌────────────┐  connect ok   ┌─────────┐  loop stopped  ┌──────────────┐
//!   │ Connecting │ ────────────▶ │ Running │ ─────────────▶ │ WaitingRetry │
//!   └────────────┘               └─────────┘                └──────────────┘
//!         ▲  │ connect failed                                      │
//!         │  └─────────────────────────────────────────────────────▶│
//!         └────────────────────── retry delay elapsed ─────────────┘
//! ```
//!
//! Each `Running` phase owns a fresh [`Link`] and runs one telemetry loop on
//! a dedicated thread while the link's own I/O task services liveness. The
//! link is never reused: when the loop stops the link is closed, awaited,
//! and dropped before the retry delay starts.

pub mod liveness;

use std::thread;

use log::{error, info, warn};

use crate::app::ports::{ClockPort, CloseReport, Connector, Link};
use crate::app::telemetry::{LoopReport, LoopTiming, TelemetryLoop};
use crate::config::TelemetryConfig;
use crate::sensors::{HardwareRegistry, SensorReader};

/// Externally visible phase of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Running,
    WaitingRetry,
}

enum SessionState<L> {
    Connecting,
    Running(L),
    WaitingRetry,
}

/// Outcome of one completed `Running` phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// `None` when the telemetry thread could not be spawned or panicked.
    pub loop_report: Option<LoopReport>,
    pub close: CloseReport,
}

pub struct SessionDriver<C: Connector, K: ClockPort> {
    connector: C,
    registry: HardwareRegistry,
    clock: K,
    config: TelemetryConfig,
    state: SessionState<C::Link>,
    attempts: u64,
    retries: u64,
    sessions: u64,
    last_report: Option<SessionReport>,
}

impl<C: Connector, K: ClockPort> SessionDriver<C, K> {
    pub fn new(connector: C, registry: HardwareRegistry, clock: K, config: TelemetryConfig) -> Self {
        Self {
            connector,
            registry,
            clock,
            config,
            state: SessionState::Connecting,
            attempts: 0,
            retries: 0,
            sessions: 0,
            last_report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::Connecting => Phase::Connecting,
            SessionState::Running(_) => Phase::Running,
            SessionState::WaitingRetry => Phase::WaitingRetry,
        }
    }

    /// Connection attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Retry delays served so far.
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Completed `Running` phases.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    pub fn registry_mut(&mut self) -> &mut HardwareRegistry {
        &mut self.registry
    }

    /// Never returns; the process ends on operator interrupt.
    pub fn run(&mut self) -> ! {
        info!(
            "LINK | session driver started (endpoint={}, retry={:?})",
            self.config.endpoint,
            self.config.retry_delay()
        );
        loop {
            self.step();
        }
    }

    /// Advance exactly one phase.
    ///
    /// `Running` blocks for the whole lifetime of the connection and
    /// `WaitingRetry` blocks for the retry delay.
    pub fn step(&mut self) {
        self.state = match core::mem::replace(&mut self.state, SessionState::WaitingRetry) {
            SessionState::Connecting => self.connect_once(),
            SessionState::Running(link) => {
                let report = self.run_session(&link);
                drop(link);
                self.sessions += 1;
                self.last_report = Some(report);
                SessionState::WaitingRetry
            }
            SessionState::WaitingRetry => {
                let delay = self.config.retry_delay();
                info!("LINK | reconnecting in {:?}", delay);
                thread::sleep(delay);
                self.retries += 1;
                SessionState::Connecting
            }
        };
    }

    // ── Internal ──────────────────────────────────────────────

    fn connect_once(&mut self) -> SessionState<C::Link> {
        self.attempts += 1;
        info!("LINK | connecting to {} (attempt {})", self.config.endpoint, self.attempts);
        match self.connector.connect() {
            Ok(link) => {
                info!("LINK | connected");
                SessionState::Running(link)
            }
            Err(e) => {
                warn!("LINK | connect failed: {}", e);
                SessionState::WaitingRetry
            }
        }
    }

    fn run_session(&mut self, link: &C::Link) -> SessionReport {
        let timing = LoopTiming::from(&self.config);
        let noise_floor = self.config.pressure_noise_floor;
        let threshold_cm = self.config.seat_threshold_cm;
        let registry = &mut self.registry;
        let clock = &self.clock;

        let loop_report = thread::scope(|s| {
            let spawned = thread::Builder::new()
                .name("telemetry".into())
                .spawn_scoped(s, move || {
                    let mut reader = SensorReader::new(registry, noise_floor, threshold_cm);
                    TelemetryLoop::new(&mut reader, link, clock, timing).run()
                });
            match spawned {
                Ok(handle) => match handle.join() {
                    Ok(report) => Some(report),
                    Err(_) => {
                        error!("CYCLE | telemetry thread panicked");
                        None
                    }
                },
                Err(e) => {
                    error!("CYCLE | failed to spawn telemetry thread: {}", e);
                    None
                }
            }
        });

        link.fail("telemetry loop ended");
        let close = link.wait_closed();
        info!(
            "LINK | connection closed (code={}, reason={})",
            close.code.map_or_else(|| "-".to_owned(), |c| c.to_string()),
            close.reason
        );
        SessionReport { loop_report, close }
    }
}
