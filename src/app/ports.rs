//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TelemetryLoop / SessionDriver (domain)
//! ```
//!
//! Hardware drivers implement [`AnalogChannel`] and [`DistanceSensor`]; the
//! WebSocket adapter implements [`Connector`] and [`Link`]. The domain core
//! consumes them via generics or trait objects, so it never touches a
//! socket or a GPIO line directly and is fully testable with mocks.

use chrono::{DateTime, Utc};

use crate::config::TelemetryConfig;
use crate::error::{ConfigError, ConnectError, LinkError, SensorError};
use crate::sensors::pressure::PressureValues;

// ───────────────────────────────────────────────────────────────
// Hardware ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One analog input line.
pub trait AnalogChannel: Send {
    /// Normalised reading in `[0.0, 1.0]`.
    fn read(&mut self) -> Result<f32, SensorError>;
}

/// Range finder used for occupancy detection.
pub trait DistanceSensor: Send {
    /// Distance in meters, or `None` when the sensor has no reading yet.
    fn distance_m(&mut self) -> Result<Option<f32>, SensorError>;
}

/// Read-side port: the telemetry loop calls this once per cycle.
///
/// Implementations never fail — per-channel faults are absorbed and
/// replaced by safe defaults.
pub trait SensorPort {
    /// All eight pressure channels, noise-floored.
    fn read_pressure(&mut self) -> PressureValues;

    /// Whether someone is sitting on the seat.
    fn read_occupancy(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for packet timestamps.
pub trait ClockPort: Sync {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Transport ports (driven adapters: domain → network)
// ───────────────────────────────────────────────────────────────

/// Why and how a connection ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseReport {
    /// WebSocket close status code, when the peer sent one.
    pub code: Option<u16>,
    /// Close reason or local failure cause.
    pub reason: String,
}

/// Handle to one established connection.
///
/// Shared between the connection's own I/O task and the telemetry loop;
/// the loop only queries usability and enqueues frames.
pub trait Link: Send + Sync {
    /// Non-blocking liveness check. Never changes the connection state.
    fn is_usable(&self) -> bool;

    /// Hand a serialised message to the transport.
    ///
    /// `Ok(true)` — enqueued (fire-and-forget, delivery not guaranteed).
    /// `Ok(false)` — the connection was not usable; nothing was sent.
    /// `Err(_)` — the connection is usable but cannot take the frame.
    fn try_send(&self, message: &str) -> Result<bool, LinkError>;

    /// Declare the connection dead. No-op once it is already terminal.
    fn fail(&self, cause: &str);

    /// Block until the transport has fully shut down.
    fn wait_closed(&self) -> CloseReport;
}

/// Opens fresh connections. One [`Link`] per successful call; links are
/// never reused across reconnects.
pub trait Connector {
    type Link: Link;

    fn connect(&mut self) -> Result<Self::Link, ConnectError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST validate before returning; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Returns [`ConfigError::NotFound`] if no stored config exists.
    fn load(&self) -> Result<TelemetryConfig, ConfigError>;
}
