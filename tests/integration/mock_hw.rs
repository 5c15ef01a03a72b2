//! Mock adapters for integration tests.
//!
//! Records every send and failure so tests can assert on the full
//! connection history without opening a socket or touching SPI/GPIO.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use seatlink::app::ports::{
    AnalogChannel, CloseReport, Connector, DistanceSensor, Link, SensorPort,
};
use seatlink::error::{ConnectError, LinkError, SensorError};
use seatlink::sensors::pressure::PressureValues;

// ── MockLink ──────────────────────────────────────────────────

/// Link that accepts sends until a scripted limit, then reports unusable.
pub struct MockLink {
    open: AtomicBool,
    close_after: Option<usize>,
    reject_with: Option<LinkError>,
    pub sent: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<String>>,
    pub usable_checks: AtomicUsize,
}

#[allow(dead_code)]
impl MockLink {
    /// Stays open forever.
    pub fn open() -> Self {
        Self {
            open: AtomicBool::new(true),
            close_after: None,
            reject_with: None,
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            usable_checks: AtomicUsize::new(0),
        }
    }

    /// Peer goes away right after the `n`-th accepted send.
    pub fn closing_after(n: usize) -> Self {
        Self {
            close_after: Some(n),
            ..Self::open()
        }
    }

    /// Open, but every send is refused with `err`.
    pub fn rejecting(err: LinkError) -> Self {
        Self {
            reject_with: Some(err),
            ..Self::open()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Link for MockLink {
    fn is_usable(&self) -> bool {
        self.usable_checks.fetch_add(1, Ordering::SeqCst);
        self.is_open()
    }

    fn try_send(&self, message: &str) -> Result<bool, LinkError> {
        if !self.is_open() {
            return Ok(false);
        }
        if let Some(err) = self.reject_with {
            return Err(err);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.to_owned());
        if self.close_after.is_some_and(|n| sent.len() >= n) {
            self.open.store(false, Ordering::SeqCst);
        }
        Ok(true)
    }

    fn fail(&self, cause: &str) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.failures.lock().unwrap().push(cause.to_owned());
        }
    }

    fn wait_closed(&self) -> CloseReport {
        let reason = self
            .failures
            .lock()
            .unwrap()
            .first()
            .cloned()
            .unwrap_or_else(|| "closed by peer".to_owned());
        CloseReport { code: None, reason }
    }
}

// ── MockConnector ─────────────────────────────────────────────

/// Fails the first `failures` attempts, then hands out links that close
/// after `sends_per_link` sends.
pub struct MockConnector {
    failures: usize,
    sends_per_link: usize,
    pub attempts: usize,
}

#[allow(dead_code)]
impl MockConnector {
    pub fn new(failures: usize, sends_per_link: usize) -> Self {
        Self {
            failures,
            sends_per_link,
            attempts: 0,
        }
    }
}

impl Connector for MockConnector {
    type Link = MockLink;

    fn connect(&mut self) -> Result<MockLink, ConnectError> {
        self.attempts += 1;
        if self.attempts <= self.failures {
            return Err(ConnectError::Tcp("connection refused".into()));
        }
        Ok(MockLink::closing_after(self.sends_per_link))
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Sensor port returning fixed values and counting reads.
pub struct FixedSensors {
    pub pressure: PressureValues,
    pub seated: bool,
    pub reads: Vec<&'static str>,
}

#[allow(dead_code)]
impl FixedSensors {
    pub fn new(pressure: [u16; 8], seated: bool) -> Self {
        Self {
            pressure: PressureValues::new(pressure),
            seated,
            reads: Vec::new(),
        }
    }
}

impl SensorPort for FixedSensors {
    fn read_pressure(&mut self) -> PressureValues {
        self.reads.push("pressure");
        self.pressure
    }

    fn read_occupancy(&mut self) -> bool {
        self.reads.push("occupancy");
        self.seated
    }
}

/// Analog channel with a fixed normalised value.
pub struct StaticChannel(pub f32);

impl AnalogChannel for StaticChannel {
    fn read(&mut self) -> Result<f32, SensorError> {
        Ok(self.0)
    }
}

/// Analog channel whose read panics, standing in for a driver bug.
pub struct PanickingChannel;

impl AnalogChannel for PanickingChannel {
    fn read(&mut self) -> Result<f32, SensorError> {
        panic!("driver bug");
    }
}

/// Range finder with a fixed distance.
pub struct StaticRange(pub Option<f32>);

impl DistanceSensor for StaticRange {
    fn distance_m(&mut self) -> Result<Option<f32>, SensorError> {
        Ok(self.0)
    }
}
