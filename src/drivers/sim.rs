//! Simulated seat hardware for hosts without SPI/GPIO.
//!
//! Values live in process-wide atomics so a test, a demo script or an
//! operator console can inject readings while the telemetry loop runs.
//! Distance is stored in millimetres; [`NO_ECHO`] means "no reading".

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::app::ports::{AnalogChannel, DistanceSensor};
use crate::error::SensorError;
use crate::pins::ADC_CHANNELS;

use super::mcp3008::ADC_FULL_SCALE;

const NO_ECHO: u32 = u32::MAX;

static SIM_PRESSURE: [AtomicU16; ADC_CHANNELS] = [const { AtomicU16::new(0) }; ADC_CHANNELS];
static SIM_DISTANCE_MM: AtomicU32 = AtomicU32::new(NO_ECHO);

/// Inject a raw 10-bit reading for `channel`. Values above full scale clamp.
pub fn sim_set_pressure(channel: usize, raw: u16) {
    if let Some(slot) = SIM_PRESSURE.get(channel) {
        slot.store(raw.min(ADC_FULL_SCALE), Ordering::Relaxed);
    }
}

/// Inject a distance, or `None` for "no echo".
pub fn sim_set_distance_mm(mm: Option<u32>) {
    SIM_DISTANCE_MM.store(mm.unwrap_or(NO_ECHO), Ordering::Relaxed);
}

pub struct SimChannel {
    channel: usize,
}

impl SimChannel {
    pub fn new(channel: usize) -> Self {
        Self { channel }
    }
}

impl AnalogChannel for SimChannel {
    fn read(&mut self) -> Result<f32, SensorError> {
        let raw = SIM_PRESSURE
            .get(self.channel)
            .ok_or(SensorError::OutOfRange)?
            .load(Ordering::Relaxed);
        Ok(f32::from(raw) / f32::from(ADC_FULL_SCALE))
    }
}

pub struct SimRangeFinder {
    max_distance_m: f32,
}

impl SimRangeFinder {
    pub fn new(max_distance_m: f32) -> Self {
        Self { max_distance_m }
    }
}

impl DistanceSensor for SimRangeFinder {
    fn distance_m(&mut self) -> Result<Option<f32>, SensorError> {
        match SIM_DISTANCE_MM.load(Ordering::Relaxed) {
            NO_ECHO => Ok(None),
            mm => Ok(Some((mm as f32 / 1000.0).min(self.max_distance_m))),
        }
    }
}
