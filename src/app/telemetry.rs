//! Telemetry loop — the per-connection read → build → send cycle.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ Link
//!  ClockPort  ──▶ │      TelemetryLoop        │   (occupancy, then pressure)
//!                 │  Running ──▶ Stopped      │
//!                 └──────────────────────────┘
//! ```
//!
//! A loop instance is bound to exactly one [`Link`]. It never reconnects
//! and never retries: once the link is unusable, or any step of a cycle
//! fails, it moves to `Stopped` and returns. The session driver owns retry.

use core::time::Duration;

use log::{debug, error, info, warn};

use crate::config::TelemetryConfig;
use crate::error::Error;

use super::packets::{SensorFrame, Timestamp};
use super::ports::{ClockPort, Link, SensorPort};

/// Pacing for one loop instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Sleep after each completed cycle (end → next start).
    pub cycle_interval: Duration,
    /// Pause between the occupancy and the pressure send.
    pub packet_gap: Duration,
}

impl From<&TelemetryConfig> for LoopTiming {
    fn from(config: &TelemetryConfig) -> Self {
        Self {
            cycle_interval: config.cycle_interval(),
            packet_gap: config.packet_gap(),
        }
    }
}

/// Why a loop instance stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The link reported unusable before or during a send.
    LinkUnusable,
    /// A cycle step failed; the link has been declared dead.
    CycleFailed(Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped(StopReason),
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both packets were handed to the link.
    Sent,
    /// The loop moved to `Stopped`; `packets` were sent this cycle first.
    Stopped { packets: u8, reason: StopReason },
}

/// Totals reported when a loop instance finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub cycles: u64,
    pub packets_sent: u64,
    pub reason: StopReason,
}

pub struct TelemetryLoop<'a, S, L, C>
where
    S: SensorPort,
    L: Link + ?Sized,
    C: ClockPort + ?Sized,
{
    sensors: &'a mut S,
    link: &'a L,
    clock: &'a C,
    timing: LoopTiming,
    state: LoopState,
    cycles: u64,
    packets_sent: u64,
}

impl<'a, S, L, C> TelemetryLoop<'a, S, L, C>
where
    S: SensorPort,
    L: Link + ?Sized,
    C: ClockPort + ?Sized,
{
    pub fn new(sensors: &'a mut S, link: &'a L, clock: &'a C, timing: LoopTiming) -> Self {
        Self {
            sensors,
            link,
            clock,
            timing,
            state: LoopState::Running,
            cycles: 0,
            packets_sent: 0,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Run cycles until the loop stops, sleeping `cycle_interval` after each.
    pub fn run(mut self) -> LoopReport {
        info!("CYCLE | telemetry loop started");
        loop {
            match self.run_cycle() {
                CycleOutcome::Sent => std::thread::sleep(self.timing.cycle_interval),
                CycleOutcome::Stopped { reason, .. } => {
                    info!(
                        "CYCLE | telemetry loop stopped after {} cycles, {} packets ({:?})",
                        self.cycles, self.packets_sent, reason
                    );
                    return LoopReport {
                        cycles: self.cycles,
                        packets_sent: self.packets_sent,
                        reason,
                    };
                }
            }
        }
    }

    /// Execute one read → build → send cycle.
    ///
    /// Calling this after the loop has stopped is a no-op that reports the
    /// first stop reason.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        if let LoopState::Stopped(reason) = &self.state {
            return CycleOutcome::Stopped {
                packets: 0,
                reason: reason.clone(),
            };
        }
        self.cycles += 1;

        let frame = self.read_frame();
        debug!(
            "CYCLE | #{} seated={} pressure=[{}]",
            self.cycles, frame.is_seated, frame.pressure
        );

        let (occupancy, pressure) = match encode(&frame) {
            Ok(encoded) => encoded,
            Err(e) => return self.fail(0, e),
        };

        if !self.link.is_usable() {
            warn!("CYCLE | link unusable, stopping");
            return self.stop(0, StopReason::LinkUnusable);
        }

        match self.link.try_send(&occupancy) {
            Ok(true) => {
                self.packets_sent += 1;
                info!("SEND | occupancy {}", occupancy);
            }
            Ok(false) => return self.stop(0, StopReason::LinkUnusable),
            Err(e) => return self.fail(0, e.into()),
        }

        std::thread::sleep(self.timing.packet_gap);

        match self.link.try_send(&pressure) {
            Ok(true) => {
                self.packets_sent += 1;
                info!("SEND | pressure {}", pressure);
            }
            Ok(false) => {
                warn!("CYCLE | link lost between sends, pressure packet dropped");
                return self.stop(1, StopReason::LinkUnusable);
            }
            Err(e) => return self.fail(1, e.into()),
        }

        CycleOutcome::Sent
    }

    // ── Internal ──────────────────────────────────────────────

    /// Timestamp first, then occupancy, then pressure.
    fn read_frame(&mut self) -> SensorFrame {
        let timestamp = Timestamp::from_datetime(self.clock.now());
        let is_seated = self.sensors.read_occupancy();
        let pressure = self.sensors.read_pressure();
        SensorFrame {
            pressure,
            is_seated,
            timestamp,
        }
    }

    fn stop(&mut self, packets: u8, reason: StopReason) -> CycleOutcome {
        self.state = LoopState::Stopped(reason.clone());
        CycleOutcome::Stopped { packets, reason }
    }

    fn fail(&mut self, packets: u8, e: Error) -> CycleOutcome {
        error!("CYCLE | cycle failed: {}", e);
        self.link.fail(&e.to_string());
        self.stop(packets, StopReason::CycleFailed(e))
    }
}

fn encode(frame: &SensorFrame) -> Result<(String, String), Error> {
    let occupancy = serde_json::to_string(&frame.occupancy_packet())?;
    let pressure = serde_json::to_string(&frame.pressure_packet())?;
    Ok((occupancy, pressure))
}
